//! Cut plans.
//!
//! A plan is an ordered list of cuts. Each cut targets either a solid that
//! exists before the plan runs or a part produced by an earlier cut:
//!
//! ```toml
//! [[cut]]
//! target = "Body"
//! location = [0.0, 10.0, 0.0]
//! rotation = [90.0, 0.0, 0.0]
//! part_a = "Top"
//! part_b = "Bottom"
//! ```

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::PlanError;
use crate::math::Vector3;

use super::config::NamingParams;

fn default_offset() -> f64 {
    1.0
}

/// One cut of a plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CutSpec {
    /// Name of the solid to cut.
    pub target: String,
    /// Tool location in world space.
    pub location: [f64; 3],
    /// Tool rotation, XYZ Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Name of the difference part; `<target>_A` if omitted.
    #[serde(default)]
    pub part_a: Option<String>,
    /// Name of the intersection part; `<target>_B` if omitted.
    #[serde(default)]
    pub part_b: Option<String>,
    /// Where the tool shell sits relative to its surface, in `[-1, 1]`.
    #[serde(default = "default_offset")]
    pub solidify_offset: f64,
}

impl CutSpec {
    /// Creates a cut with default output names and offset `1`.
    #[must_use]
    pub fn new(target: impl Into<String>, location: [f64; 3], rotation: [f64; 3]) -> Self {
        Self {
            target: target.into(),
            location,
            rotation,
            part_a: None,
            part_b: None,
            solidify_offset: default_offset(),
        }
    }

    /// Names the two output parts.
    #[must_use]
    pub fn with_parts(mut self, part_a: impl Into<String>, part_b: impl Into<String>) -> Self {
        self.part_a = Some(part_a.into());
        self.part_b = Some(part_b.into());
        self
    }

    /// Sets the solidify offset.
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.solidify_offset = offset;
        self
    }

    /// Final name of the difference part.
    #[must_use]
    pub fn part_a_name(&self) -> String {
        self.part_a
            .clone()
            .unwrap_or_else(|| format!("{}_A", self.target))
    }

    /// Final name of the intersection part.
    #[must_use]
    pub fn part_b_name(&self) -> String {
        self.part_b
            .clone()
            .unwrap_or_else(|| format!("{}_B", self.target))
    }

    /// Tool location as a vector.
    #[must_use]
    pub fn location_vector(&self) -> Vector3 {
        Vector3::from(self.location)
    }
}

/// An ordered list of cuts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DecompositionSequence {
    /// Cuts in execution order; `[[cut]]` tables in TOML.
    #[serde(rename = "cut", default)]
    pub cuts: Vec<CutSpec>,
}

impl DecompositionSequence {
    /// Creates a sequence from cuts.
    #[must_use]
    pub fn new(cuts: Vec<CutSpec>) -> Self {
        Self { cuts }
    }

    /// Parses a plan from TOML (`[[cut]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Parse`] for malformed plans.
    pub fn from_toml_str(source: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str(source)?)
    }

    /// Number of cuts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Returns `true` if the plan has no cuts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Checks that every cut targets a solid that exists at that point,
    /// given the `roots` present before the plan runs, and that no live part
    /// is produced twice. An output may reuse the name of a root object; the
    /// cut replaces it. Outputs may not carry names the debris sweep removes.
    /// Cut numbers in errors are 1-based.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlanError`] found.
    pub fn validate<S: AsRef<str>>(
        &self,
        roots: &[S],
        naming: &NamingParams,
    ) -> Result<(), PlanError> {
        let mut roots: HashSet<&str> = roots.iter().map(|r| r.as_ref()).collect();
        let mut produced: HashSet<String> = HashSet::new();
        for (i, cut) in self.cuts.iter().enumerate() {
            let index = i + 1;
            if !produced.remove(&cut.target) && !roots.remove(cut.target.as_str()) {
                return Err(PlanError::UnknownTarget {
                    index,
                    target: cut.target.clone(),
                });
            }
            let (a, b) = (cut.part_a_name(), cut.part_b_name());
            if a == b {
                return Err(PlanError::SameOutputNames { index, name: a });
            }
            for name in [a, b] {
                if naming.is_debris(&name) {
                    return Err(PlanError::ReservedOutput { index, name });
                }
                roots.remove(name.as_str());
                if produced.contains(&name) {
                    return Err(PlanError::DuplicateOutput { index, name });
                }
                produced.insert(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GUITAR: &str = include_str!("../../plans/guitar.toml");

    #[test]
    fn guitar_plan_is_consistent() {
        let plan = DecompositionSequence::from_toml_str(GUITAR).unwrap();
        assert_eq!(plan.len(), 7);
        plan.validate(&["Guitar_Body"], &NamingParams::default()).unwrap();

        let first = &plan.cuts[0];
        assert_eq!(first.target, "Guitar_Body");
        assert_eq!(first.location, [0.0, 10.0, 0.0]);
        assert_eq!(first.rotation, [90.0, 0.0, 0.0]);
        assert_eq!(first.part_a_name(), "Guitar_Top");
        assert_eq!(first.part_b_name(), "Guitar_Bottom");
        assert!(plan.cuts.iter().all(|c| (c.solidify_offset - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let plan = DecompositionSequence::from_toml_str(
            "[[cut]]\ntarget = \"Body\"\nlocation = [1.0, 2.0, 3.0]\n",
        )
        .unwrap();
        assert_eq!(plan.cuts[0], CutSpec::new("Body", [1.0, 2.0, 3.0], [0.0; 3]));
        assert_eq!(plan.cuts[0].part_a_name(), "Body_A");
        assert_eq!(plan.cuts[0].part_b_name(), "Body_B");
    }

    #[test]
    fn cut_without_location_is_a_parse_error() {
        assert!(matches!(
            DecompositionSequence::from_toml_str("[[cut]]\ntarget = \"Body\"\n"),
            Err(PlanError::Parse(_))
        ));
        assert!(DecompositionSequence::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn unknown_target_is_reported_one_based() {
        let plan = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts("Top", "Bottom"),
            CutSpec::new("Middle", [0.0; 3], [0.0; 3]),
        ]);
        assert!(matches!(
            plan.validate(&["Body"], &NamingParams::default()),
            Err(PlanError::UnknownTarget { index: 2, ref target }) if target == "Middle"
        ));
    }

    #[test]
    fn consumed_target_cannot_be_cut_twice() {
        let plan = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]),
            CutSpec::new("Body", [0.0; 3], [0.0; 3]),
        ]);
        assert!(matches!(
            plan.validate(&["Body"], &NamingParams::default()),
            Err(PlanError::UnknownTarget { index: 2, .. })
        ));
    }

    #[test]
    fn output_names_must_be_fresh_and_distinct() {
        let same = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts("Half", "Half"),
        ]);
        assert!(matches!(
            same.validate(&["Body"], &NamingParams::default()),
            Err(PlanError::SameOutputNames { index: 1, .. })
        ));

        let clash = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts("Top", "Lid"),
            CutSpec::new("Top", [0.0; 3], [0.0; 3]).with_parts("Upper", "Lid"),
        ]);
        assert!(matches!(
            clash.validate(&["Body"], &NamingParams::default()),
            Err(PlanError::DuplicateOutput { index: 2, ref name }) if name == "Lid"
        ));

        // A stale root holding an output name is replaced, not an error.
        let stale = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts("Top", "Lid"),
        ]);
        stale.validate(&["Body", "Lid"], &NamingParams::default()).unwrap();

        let reuse = DecompositionSequence::new(vec![
            CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts("Body", "Lid"),
        ]);
        reuse.validate(&["Body"], &NamingParams::default()).unwrap();
    }

    #[test]
    fn debris_names_cannot_hold_parts() {
        let naming = NamingParams::default();
        for (a, b) in [
            ("Top.001", "Bottom"),
            ("Top", "Body_Processed"),
            ("Cutter_Tool_Temp", "Bottom"),
            ("Top", "Temp_Part_A_1000"),
        ] {
            let plan = DecompositionSequence::new(vec![
                CutSpec::new("Body", [0.0; 3], [0.0; 3]).with_parts(a, b),
            ]);
            assert!(matches!(
                plan.validate(&["Body"], &naming),
                Err(PlanError::ReservedOutput { index: 1, .. })
            ));
        }
    }
}
