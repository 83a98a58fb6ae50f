//! Tunable constants of the cut pipeline.
//!
//! Every section deserializes from TOML with missing keys falling back to
//! the defaults below:
//!
//! ```toml
//! [tool]
//! subdivision_cuts = 6
//! noise_seed = 42
//!
//! [heal]
//! merge_distance = 0.0005
//! ```

use serde::Deserialize;

use crate::error::PlanError;
use crate::scene::is_duplicate_variant;

/// Parameters of the textured cutting tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolParams {
    /// Minimum edge length of the seed plane.
    pub seed_size: f64,
    /// Seed plane edge length as a multiple of the target's bbox diagonal.
    pub coverage_factor: f64,
    /// Grid cuts per edge before smoothing.
    pub subdivision_cuts: u32,
    /// Simple-subdivision levels.
    pub smoothing_levels: u32,
    /// Noise feature size in model units.
    pub noise_scale: f64,
    /// Extra noise octaves.
    pub noise_depth: u32,
    /// Displacement amplitude; vertices move at most half of it.
    pub noise_strength: f64,
    /// Noise seed; `None` draws a new one per tool.
    pub noise_seed: Option<u64>,
    /// Minimum shell thickness.
    pub thickness: f64,
    /// Shell thickness as a multiple of the target's extent along the tool normal.
    pub thickness_ratio: f64,
}

impl Default for ToolParams {
    fn default() -> Self {
        Self {
            seed_size: 100.0,
            coverage_factor: 1.5,
            subdivision_cuts: 10,
            smoothing_levels: 2,
            noise_scale: 5.0,
            noise_depth: 2,
            noise_strength: 0.5,
            noise_seed: Some(0x5EA3),
            thickness: 50.0,
            thickness_ratio: 1.5,
        }
    }
}

impl ToolParams {
    /// Coarse tool for previews and quick checks: the same texture at a
    /// fraction of the polygon count.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            subdivision_cuts: 3,
            smoothing_levels: 1,
            ..Self::default()
        }
    }

    /// Sets the grid cuts.
    #[must_use]
    pub fn with_subdivision_cuts(mut self, cuts: u32) -> Self {
        self.subdivision_cuts = cuts;
        self
    }

    /// Sets the smoothing levels.
    #[must_use]
    pub fn with_smoothing_levels(mut self, levels: u32) -> Self {
        self.smoothing_levels = levels;
        self
    }

    /// Sets the noise seed.
    #[must_use]
    pub fn with_noise_seed(mut self, seed: Option<u64>) -> Self {
        self.noise_seed = seed;
        self
    }

    /// Sets the displacement amplitude.
    #[must_use]
    pub fn with_noise_strength(mut self, strength: f64) -> Self {
        self.noise_strength = strength;
        self
    }

    /// Seed plane edge length for a target with the given bbox diagonal.
    #[must_use]
    pub fn plane_size(&self, target_diagonal: f64) -> f64 {
        self.seed_size.max(self.coverage_factor * target_diagonal)
    }

    /// Shell thickness for a target with the given extent along the normal.
    #[must_use]
    pub fn shell_thickness(&self, target_extent: f64) -> f64 {
        self.thickness.max(self.thickness_ratio * target_extent)
    }
}

/// Parameters of the target healing pass and result post-processing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealParams {
    /// Weld distance when healing the target.
    pub merge_distance: f64,
    /// Largest boundary loop the hole filler caps.
    pub fill_hole_max_sides: usize,
    /// Weld distance applied to boolean results.
    pub post_merge_distance: f64,
}

impl Default for HealParams {
    fn default() -> Self {
        Self {
            merge_distance: 0.001,
            fill_hole_max_sides: 64,
            post_merge_distance: 0.001,
        }
    }
}

impl HealParams {
    /// Sets the target weld distance.
    #[must_use]
    pub fn with_merge_distance(mut self, distance: f64) -> Self {
        self.merge_distance = distance;
        self
    }
}

/// Reserved object names used while a cut is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingParams {
    /// Name of the seed plane before duplication.
    pub seed_name: String,
    /// Name of the cutting tool.
    pub tool_name: String,
    /// Suffix marking a target that is being split.
    pub processed_suffix: String,
    /// Prefix of the scratch names used while renaming outputs.
    pub scratch_prefix: String,
}

impl Default for NamingParams {
    fn default() -> Self {
        Self {
            seed_name: "Auto_Cutter".into(),
            tool_name: "Cutter_Tool_Temp".into(),
            processed_suffix: "_Processed".into(),
            scratch_prefix: "Temp_Part".into(),
        }
    }
}

impl NamingParams {
    /// Name a target carries while it is being split.
    #[must_use]
    pub fn processed_name(&self, target: &str) -> String {
        format!("{target}{}", self.processed_suffix)
    }

    /// Returns `true` for names only the pipeline creates.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.seed_name
            || name == self.tool_name
            || name.ends_with(&self.processed_suffix)
            || name
                .strip_prefix(&self.scratch_prefix)
                .is_some_and(|rest| rest.starts_with('_'))
    }

    /// Returns `true` for names the debris sweep removes: reserved names and
    /// `.NNN` duplicate variants. Such names cannot hold a finished part.
    #[must_use]
    pub fn is_debris(&self, name: &str) -> bool {
        self.is_reserved(name) || is_duplicate_variant(name)
    }

    /// Scratch name for an output part in flight; `slot` is `'A'` or `'B'`.
    #[must_use]
    pub fn scratch_name(&self, slot: char, tag: u32) -> String {
        format!("{}_{slot}_{tag}", self.scratch_prefix)
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    pub tool: ToolParams,
    pub heal: HealParams,
    pub naming: NamingParams,
}

impl CutConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Parse`] for malformed TOML or mistyped values.
    pub fn from_toml_str(source: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str(source)?)
    }

    /// Replaces the tool parameters.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolParams) -> Self {
        self.tool = tool;
        self
    }

    /// Replaces the heal parameters.
    #[must_use]
    pub fn with_heal(mut self, heal: HealParams) -> Self {
        self.heal = heal;
        self
    }

    /// Replaces the naming parameters.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingParams) -> Self {
        self.naming = naming;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(CutConfig::from_toml_str("").unwrap(), CutConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CutConfig::from_toml_str(
            "[tool]\nsubdivision_cuts = 4\nnoise_seed = 9\n\n[naming]\ntool_name = \"Knife\"\n",
        )
        .unwrap();
        assert_eq!(config.tool.subdivision_cuts, 4);
        assert_eq!(config.tool.noise_seed, Some(9));
        assert_eq!(config.tool.smoothing_levels, 2);
        assert_eq!(config.naming.tool_name, "Knife");
        assert_eq!(config.naming.seed_name, "Auto_Cutter");
        assert_eq!(config.heal, HealParams::default());
    }

    #[test]
    fn mistyped_value_is_a_parse_error() {
        assert!(matches!(
            CutConfig::from_toml_str("[tool]\nsubdivision_cuts = \"many\"\n"),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn sizes_grow_with_target() {
        let tool = ToolParams::default();
        assert!((tool.plane_size(10.0) - 100.0).abs() < f64::EPSILON);
        assert!((tool.plane_size(100.0) - 150.0).abs() < 1e-12);
        assert!((tool.shell_thickness(20.0) - 50.0).abs() < f64::EPSILON);
        assert!((tool.shell_thickness(50.0) - 75.0).abs() < 1e-12);
    }

    #[test]
    fn reserved_names() {
        let naming = NamingParams::default();
        assert!(naming.is_reserved("Auto_Cutter"));
        assert!(naming.is_reserved("Cutter_Tool_Temp"));
        assert!(naming.is_reserved("Body_Processed"));
        assert!(naming.is_reserved("Temp_Part_A_4821"));
        assert!(!naming.is_reserved("Temp_Parts"));
        assert!(!naming.is_reserved("Body"));
        assert_eq!(naming.scratch_name('B', 1234), "Temp_Part_B_1234");
        assert!(naming.is_debris("Top.001"));
        assert!(naming.is_debris("Cutter_Tool_Temp"));
        assert!(!naming.is_debris("Top.1"));
        assert_eq!(naming.processed_name("Body"), "Body_Processed");
    }
}
