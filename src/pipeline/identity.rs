use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::CutError;
use crate::scene::{SceneStore, SolidId};

use super::config::NamingParams;

/// Range of the random tag in scratch names.
const SCRATCH_TAGS: std::ops::RangeInclusive<u32> = 1000..=9999;

/// Gives the two fresh parts of a cut their final names.
///
/// Both parts first move to random scratch names, so neither can be mistaken
/// for a stale holder of a final name. Stale holders are then deleted and the
/// parts renamed. The three steps always run in this order.
pub struct ResolveIdentity<'a> {
    part_a: SolidId,
    part_b: SolidId,
    name_a: &'a str,
    name_b: &'a str,
    naming: &'a NamingParams,
}

impl<'a> ResolveIdentity<'a> {
    /// Creates a new `ResolveIdentity` operation.
    #[must_use]
    pub fn new(
        part_a: SolidId,
        part_b: SolidId,
        name_a: &'a str,
        name_b: &'a str,
        naming: &'a NamingParams,
    ) -> Self {
        Self {
            part_a,
            part_b,
            name_a,
            name_b,
            naming,
        }
    }

    /// Executes the renaming. Returns the number of stale objects removed.
    ///
    /// # Errors
    ///
    /// Returns [`CutError::NamingCollision`] if both parts ask for the same
    /// name or the two handles are the same object, and propagates scene
    /// errors for dead handles.
    pub fn execute(&self, scene: &mut SceneStore) -> Result<usize, CutError> {
        if self.name_a == self.name_b {
            return Err(CutError::NamingCollision(self.name_a.to_owned()));
        }
        if self.part_a == self.part_b {
            return Err(CutError::NamingCollision(
                scene.get(self.part_a)?.name().to_owned(),
            ));
        }

        let mut rng = rand::thread_rng();
        for (slot, id) in [('A', self.part_a), ('B', self.part_b)] {
            let scratch = loop {
                let candidate = self.naming.scratch_name(slot, rng.gen_range(SCRATCH_TAGS));
                if !scene.contains_name(&candidate) {
                    break candidate;
                }
            };
            debug!(from = scene.get(id)?.name(), to = %scratch, "moved part to scratch name");
            scene.rename(id, &scratch)?;
        }

        let mut removed = 0;
        for name in [self.name_a, self.name_b] {
            if let Some(stale) = scene.remove_named(name) {
                warn!(name = %name, kind = ?stale.kind, "removed stale object holding an output name");
                removed += 1;
            }
        }

        scene.rename(self.part_a, self.name_a)?;
        scene.rename(self.part_b, self.name_b)?;
        info!(part_a = self.name_a, part_b = self.name_b, "parts named");
        Ok(removed)
    }
}
