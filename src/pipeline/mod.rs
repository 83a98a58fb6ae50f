//! The cut pipeline.
//!
//! A cut heals its target ([`Precondition`]), builds a textured cutting
//! solid ([`SynthesizeTool`]), splits the target into a difference and an
//! intersection part ([`RobustSplit`]), and names the parts
//! ([`ResolveIdentity`]). [`CutOrchestrator`] chains cuts into sequences
//! and sweeps debris ([`SweepDebris`]).

pub mod config;
mod identity;
mod orchestrator;
mod precondition;
mod sequence;
mod split;
mod sweep;
mod tool;

pub use config::{CutConfig, HealParams, NamingParams, ToolParams};
pub use identity::ResolveIdentity;
pub use orchestrator::{CutOrchestrator, CutReport, SequenceFailure, SequenceReport};
pub use precondition::{HealReport, Precondition};
pub use sequence::{CutSpec, DecompositionSequence};
pub use split::{CutResult, RobustSplit};
pub use sweep::SweepDebris;
pub use tool::{CuttingTool, SynthesizeTool};

use crate::error::{CutError, KernelError, SeamcutError};

/// Narrows the error of an object-level operation to a cut error.
fn narrow(error: SeamcutError) -> CutError {
    match error {
        SeamcutError::Cut(e) => e,
        SeamcutError::Scene(e) => e.into(),
        SeamcutError::Kernel(e) => e.into(),
        SeamcutError::Plan(e) => KernelError::Failed(e.to_string()).into(),
    }
}
