use tracing::{debug, error, info};

use crate::error::{CutError, SeamcutError};
use crate::kernel::{BooleanSolver, GeometryKernel};
use crate::scene::{SceneStore, SolidId};

use super::config::CutConfig;
use super::identity::ResolveIdentity;
use super::precondition::{HealReport, Precondition};
use super::sequence::{CutSpec, DecompositionSequence};
use super::split::RobustSplit;
use super::sweep::SweepDebris;
use super::tool::{CuttingTool, SynthesizeTool};

/// Record of a completed cut.
#[derive(Debug, Clone)]
pub struct CutReport {
    /// Name the consumed target had.
    pub target: String,
    /// Final name of the difference part.
    pub part_a: String,
    /// Final name of the intersection part.
    pub part_b: String,
    /// Solver that produced part A.
    pub tier_a: BooleanSolver,
    /// Solver that produced part B.
    pub tier_b: BooleanSolver,
    /// What healing changed on the target.
    pub heal: HealReport,
    /// Noise seed of the cutting tool.
    pub noise_seed: u64,
    /// Stale objects removed to free the output names.
    pub replaced: usize,
    /// Per-attempt diagnostic lines.
    pub diagnostic: Vec<String>,
}

impl CutReport {
    /// Returns `true` if either part needed the approximate solver.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.tier_a == BooleanSolver::Approximate || self.tier_b == BooleanSolver::Approximate
    }
}

/// The cut a sequence stopped at.
#[derive(Debug)]
pub struct SequenceFailure {
    /// 1-based cut number; `0` if the plan could not be checked at all.
    pub index: usize,
    /// Target of the failed cut, if known.
    pub target: Option<String>,
    /// What went wrong.
    pub error: SeamcutError,
}

/// Outcome of a sequence run.
#[derive(Debug, Default)]
pub struct SequenceReport {
    /// Cuts that completed, in order.
    pub completed: Vec<CutReport>,
    /// Where the run stopped, if it did.
    pub failure: Option<SequenceFailure>,
    /// Names removed by the final sweep.
    pub swept: Vec<String>,
}

impl SequenceReport {
    /// Returns `true` if every cut completed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs cuts and cut sequences over a scene.
///
/// Each cut goes through lookup, healing, tool synthesis, split, and
/// naming. The tool is removed whatever the outcome. Sequences stop at the
/// first failed cut; parts produced before it stay in the scene. Every run
/// ends with a debris sweep.
#[derive(Debug)]
pub struct CutOrchestrator<K: GeometryKernel> {
    kernel: K,
    config: CutConfig,
}

impl<K: GeometryKernel> CutOrchestrator<K> {
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            config: CutConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CutConfig) -> Self {
        self.config = config;
        self
    }

    /// The geometry kernel.
    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    /// Performs one cut.
    ///
    /// # Errors
    ///
    /// Returns the [`CutError`] of the first stage that failed.
    pub fn try_cut(&self, scene: &mut SceneStore, spec: &CutSpec) -> Result<CutReport, CutError> {
        let (name_a, name_b) = (spec.part_a_name(), spec.part_b_name());
        if name_a == name_b {
            return Err(CutError::NamingCollision(name_a));
        }
        if let Some(name) = [&name_a, &name_b]
            .into_iter()
            .find(|name| self.config.naming.is_debris(name))
        {
            return Err(CutError::ReservedName(name.clone()));
        }
        info!(target_name = %spec.target, part_a = %name_a, part_b = %name_b, "cut started");

        let target = scene
            .id_of(&spec.target)
            .ok_or_else(|| CutError::NotFound(spec.target.clone()))?;
        let heal = Precondition::new(target, &self.config.heal).execute(&self.kernel, scene)?;
        let tool = SynthesizeTool::new(
            target,
            spec.location_vector(),
            spec.rotation,
            spec.solidify_offset,
            &self.config.tool,
            &self.config.naming,
        )
        .execute(&self.kernel, scene)?;

        let outcome = self.split_and_name(scene, target, &tool, &name_a, &name_b);
        scene.remove(tool.id);
        debug!("cutting tool removed");

        let (tier_a, tier_b, replaced, diagnostic) = outcome?;
        info!(%tier_a, %tier_b, "cut complete");
        Ok(CutReport {
            target: spec.target.clone(),
            part_a: name_a,
            part_b: name_b,
            tier_a,
            tier_b,
            heal,
            noise_seed: tool.noise_seed,
            replaced,
            diagnostic,
        })
    }

    fn split_and_name(
        &self,
        scene: &mut SceneStore,
        target: SolidId,
        tool: &CuttingTool,
        name_a: &str,
        name_b: &str,
    ) -> Result<(BooleanSolver, BooleanSolver, usize, Vec<String>), CutError> {
        let result = RobustSplit::new(
            target,
            tool.id,
            name_a,
            name_b,
            &self.config.heal,
            &self.config.naming,
        )
        .execute(&self.kernel, scene)?;

        let (Some(part_a), Some(part_b), Some(tier_a), Some(tier_b)) =
            (result.part_a, result.part_b, result.tier_a, result.tier_b)
        else {
            for line in &result.diagnostic {
                error!(diagnostic = %line, "split failed");
            }
            return Err(result.failure.unwrap_or_else(|| CutError::CriticalSplitFailure {
                part: name_a.to_owned(),
                op: "split".into(),
            }));
        };

        let replaced = ResolveIdentity::new(part_a, part_b, name_a, name_b, &self.config.naming)
            .execute(scene)?;
        Ok((tier_a, tier_b, replaced, result.diagnostic))
    }

    /// Performs one cut, sweeps debris, and reports success.
    pub fn cut(&self, scene: &mut SceneStore, spec: &CutSpec) -> bool {
        let outcome = self.try_cut(scene, spec);
        if let Err(e) = &outcome {
            error!(target_name = %spec.target, error = %e, "cut failed");
        }
        self.sweep(scene);
        outcome.is_ok()
    }

    /// Removes debris left by cuts. Returns the removed names.
    pub fn sweep(&self, scene: &mut SceneStore) -> Vec<String> {
        SweepDebris::new(&self.config.naming).execute(scene)
    }

    /// Runs a sequence, stopping at the first failed cut.
    ///
    /// The plan is checked against the scene before anything runs. The
    /// debris sweep runs at the end in every case.
    pub fn run(&self, scene: &mut SceneStore, sequence: &DecompositionSequence) -> SequenceReport {
        let mut report = SequenceReport::default();
        info!(cuts = sequence.len(), "sequence started");

        if let Err(e) = sequence.validate(&scene.names(), &self.config.naming) {
            let index = e.index().unwrap_or(0);
            error!(cut = index, error = %e, "sequence rejected");
            report.failure = Some(SequenceFailure {
                index,
                target: index
                    .checked_sub(1)
                    .and_then(|i| sequence.cuts.get(i))
                    .map(|c| c.target.clone()),
                error: e.into(),
            });
        } else {
            for (i, spec) in sequence.cuts.iter().enumerate() {
                match self.try_cut(scene, spec) {
                    Ok(cut) => report.completed.push(cut),
                    Err(e) => {
                        error!(
                            cut = i + 1,
                            of = sequence.len(),
                            target_name = %spec.target,
                            error = %e,
                            "cut failed, stopping sequence"
                        );
                        report.failure = Some(SequenceFailure {
                            index: i + 1,
                            target: Some(spec.target.clone()),
                            error: e.into(),
                        });
                        break;
                    }
                }
            }
        }

        report.swept = self.sweep(scene);
        info!(
            completed = report.completed.len(),
            swept = report.swept.len(),
            success = report.success(),
            "sequence finished"
        );
        report
    }

    /// Runs a sequence and reports whether every cut completed.
    pub fn run_sequence(&self, scene: &mut SceneStore, sequence: &DecompositionSequence) -> bool {
        self.run(scene, sequence).success()
    }
}
