mod apply;

pub use apply::ApplyTransform;
