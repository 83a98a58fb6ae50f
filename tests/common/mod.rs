#![allow(dead_code)]

use std::cell::Cell;

use seamcut::error::KernelError;
use seamcut::kernel::{BooleanOp, BooleanSolver, GeometryKernel, MeshKernel, NoiseField};
use seamcut::math::Point3;
use seamcut::mesh::Mesh;
use seamcut::operations::creation::MakeBox;
use seamcut::pipeline::{CutConfig, CutOrchestrator, ToolParams};
use seamcut::scene::{SceneStore, SolidId};

/// Installs a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// The 100 x 50 x 30 "Body" box, spanning y in [0, 50].
pub fn body(scene: &mut SceneStore) -> SolidId {
    MakeBox::new(
        "Body",
        Point3::new(-50.0, 0.0, -15.0),
        Point3::new(50.0, 50.0, 15.0),
    )
    .execute(scene)
    .unwrap()
}

pub fn preview_config() -> CutConfig {
    CutConfig::default().with_tool(ToolParams::preview())
}

pub fn orchestrator<K: GeometryKernel>(kernel: K) -> CutOrchestrator<K> {
    CutOrchestrator::new(kernel).with_config(preview_config())
}

type Fault = dyn Fn(&Mesh, BooleanOp, BooleanSolver) -> Option<Result<Mesh, KernelError>>;

/// Wraps [`MeshKernel`] and lets a test override boolean results.
///
/// The fault sees the target mesh, operation and solver; returning `Some`
/// replaces the real result. Triangulation can also be made to fail once a
/// given number of booleans has run.
pub struct Faulty {
    inner: MeshKernel,
    fault: Box<Fault>,
    booleans: Cell<usize>,
    triangulate_fails_after: Option<usize>,
}

impl Faulty {
    pub fn new(
        fault: impl Fn(&Mesh, BooleanOp, BooleanSolver) -> Option<Result<Mesh, KernelError>> + 'static,
    ) -> Self {
        Self {
            inner: MeshKernel::new(),
            fault: Box::new(fault),
            booleans: Cell::new(0),
            triangulate_fails_after: None,
        }
    }

    /// Booleans behave; triangulation errors from the `n`-th boolean on.
    pub fn triangulate_fails_after(n: usize) -> Self {
        Self {
            triangulate_fails_after: Some(n),
            ..Self::new(|_, _, _| None)
        }
    }

    /// Exact difference returns the target re-meshed on a finer grid.
    pub fn remeshed_exact_difference() -> Self {
        Self::new(|target, op, solver| {
            (solver == BooleanSolver::Exact && op == BooleanOp::Difference).then(|| {
                let mut mesh = target.clone();
                MeshKernel::new().subdivide(&mut mesh, 2)?;
                Ok(mesh)
            })
        })
    }

    /// Exact solver silently returns nothing.
    pub fn silent_exact() -> Self {
        Self::new(|_, _, solver| (solver == BooleanSolver::Exact).then(|| Ok(Mesh::new())))
    }

    /// Exact difference returns the uncut target.
    pub fn uncut_exact_difference() -> Self {
        Self::new(|target, op, solver| {
            (solver == BooleanSolver::Exact && op == BooleanOp::Difference)
                .then(|| Ok(target.clone()))
        })
    }

    /// Every attempt at `op` comes back empty.
    pub fn empty(op: BooleanOp) -> Self {
        Self::new(move |_, o, _| (o == op).then(|| Ok(Mesh::new())))
    }
}

impl GeometryKernel for Faulty {
    fn seed_plane(&self, size: f64) -> Result<Mesh, KernelError> {
        self.inner.seed_plane(size)
    }

    fn subdivide(&self, mesh: &mut Mesh, cuts: u32) -> Result<(), KernelError> {
        self.inner.subdivide(mesh, cuts)
    }

    fn subdivide_simple(&self, mesh: &mut Mesh, levels: u32) -> Result<(), KernelError> {
        self.inner.subdivide_simple(mesh, levels)
    }

    fn displace(&self, mesh: &mut Mesh, noise: &NoiseField, strength: f64) -> Result<(), KernelError> {
        self.inner.displace(mesh, noise, strength)
    }

    fn solidify(&self, mesh: &mut Mesh, thickness: f64, offset: f64) -> Result<(), KernelError> {
        self.inner.solidify(mesh, thickness, offset)
    }

    fn triangulate(&self, mesh: &mut Mesh) -> Result<(), KernelError> {
        if self
            .triangulate_fails_after
            .is_some_and(|n| self.booleans.get() >= n)
        {
            return Err(KernelError::Failed("triangulation fault".into()));
        }
        self.inner.triangulate(mesh)
    }

    fn recalculate_normals(&self, mesh: &mut Mesh) -> Result<(), KernelError> {
        self.inner.recalculate_normals(mesh)
    }

    fn merge_by_distance(&self, mesh: &mut Mesh, distance: f64) -> Result<usize, KernelError> {
        self.inner.merge_by_distance(mesh, distance)
    }

    fn remove_loose(&self, mesh: &mut Mesh) -> Result<usize, KernelError> {
        self.inner.remove_loose(mesh)
    }

    fn fill_holes(&self, mesh: &mut Mesh, max_sides: usize) -> Result<usize, KernelError> {
        self.inner.fill_holes(mesh, max_sides)
    }

    fn boolean(
        &self,
        target: &Mesh,
        tool: &Mesh,
        op: BooleanOp,
        solver: BooleanSolver,
    ) -> Result<Mesh, KernelError> {
        self.booleans.set(self.booleans.get() + 1);
        match (self.fault)(target, op, solver) {
            Some(result) => result,
            None => self.inner.boolean(target, tool, op, solver),
        }
    }
}
