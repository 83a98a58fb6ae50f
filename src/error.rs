use thiserror::Error;

/// Top-level error type for the seamcut pipeline.
#[derive(Debug, Error)]
pub enum SeamcutError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Cut(#[from] CutError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Errors raised by the scene store.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no object named '{0}'")]
    NotFound(String),

    #[error("object handle is stale")]
    StaleId,

    #[error("name '{0}' is already held by another object")]
    NamingCollision(String),
}

/// Errors raised by a geometry kernel primitive.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("non-manifold input: {0}")]
    NonManifoldInput(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("kernel operation failed: {0}")]
    Failed(String),
}

/// Failures of a single cut.
#[derive(Debug, Error)]
pub enum CutError {
    #[error("target '{0}' not found")]
    NotFound(String),

    #[error("target '{0}' is not a mesh")]
    NotAMesh(String),

    #[error("target '{0}' has no geometry")]
    EmptyMesh(String),

    #[error("cutting tool synthesis failed: {0}")]
    ToolSynthesisFailure(String),

    #[error("{op} for '{part}' produced an empty result")]
    BooleanEmptyResult { part: String, op: String },

    #[error("{op} for '{part}' returned the uncut target")]
    BooleanFullResult { part: String, op: String },

    #[error("naming collision on '{0}'")]
    NamingCollision(String),

    #[error("'{0}' is a reserved name and cannot hold a part")]
    ReservedName(String),

    #[error("both solvers failed to produce '{part}' ({op})")]
    CriticalSplitFailure { part: String, op: String },

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Errors in a decomposition plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to parse plan: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cut #{index} targets '{target}', which no earlier cut produces")]
    UnknownTarget { index: usize, target: String },

    #[error("cut #{index} re-uses output name '{name}'")]
    DuplicateOutput { index: usize, name: String },

    #[error("cut #{index} gives both parts the name '{name}'")]
    SameOutputNames { index: usize, name: String },

    #[error("cut #{index} names a part '{name}', which is reserved for cut debris")]
    ReservedOutput { index: usize, name: String },
}

impl PlanError {
    /// 1-based number of the offending cut, if the error is about one cut.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Parse(_) => None,
            Self::UnknownTarget { index, .. }
            | Self::DuplicateOutput { index, .. }
            | Self::SameOutputNames { index, .. }
            | Self::ReservedOutput { index, .. } => Some(*index),
        }
    }
}

/// Convenience type alias for results using [`SeamcutError`].
pub type Result<T> = std::result::Result<T, SeamcutError>;
