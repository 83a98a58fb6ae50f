//! Object-level operations on the scene store.

pub mod creation;
pub mod query;
pub mod transform;
