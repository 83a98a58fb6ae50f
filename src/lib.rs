pub mod error;
pub mod kernel;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod pipeline;
pub mod scene;

pub use error::{Result, SeamcutError};
pub use kernel::{GeometryKernel, MeshKernel};
pub use pipeline::{CutConfig, CutOrchestrator, CutSpec, DecompositionSequence};
pub use scene::SceneStore;
