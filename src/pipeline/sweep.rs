use tracing::{debug, info};

use crate::scene::SceneStore;

use super::config::NamingParams;

/// Removes leftovers of cuts: tool and seed names, processed parents,
/// scratch names, and `.NNN` duplicate variants.
///
/// Returns the removed names, sorted. Running it again removes nothing.
pub struct SweepDebris<'a> {
    naming: &'a NamingParams,
}

impl<'a> SweepDebris<'a> {
    /// Creates a new `SweepDebris` operation.
    #[must_use]
    pub fn new(naming: &'a NamingParams) -> Self {
        Self { naming }
    }

    /// Executes the sweep.
    pub fn execute(&self, scene: &mut SceneStore) -> Vec<String> {
        let debris: Vec<String> = scene
            .names()
            .into_iter()
            .filter(|name| self.naming.is_debris(name))
            .collect();
        for name in &debris {
            scene.remove_named(name);
            debug!(name = %name, "swept");
        }
        if !debris.is_empty() {
            info!(count = debris.len(), "debris swept");
        }
        debris
    }
}
