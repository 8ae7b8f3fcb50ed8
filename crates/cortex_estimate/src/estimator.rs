//! Declarative memory estimators.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;
use crate::value::{InputSource, InputValue};
use crate::volume::{HeaderVolumeReader, VolumeReader};

/// Fixed overhead added to every estimate, in GB.
pub const DEFAULT_OVERHEAD_GB: f64 = 0.3;
/// Default lower clamp, in GB.
pub const DEFAULT_MIN_GB: f64 = 0.5;
/// Default upper clamp, in GB.
pub const DEFAULT_MAX_GB: f64 = 8.0;
/// Separator used by [`Estimate::report`].
pub const TRAIL_SEPARATOR: &str = " | ";

const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

/// How strongly one input drives memory use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputWeight {
    /// The input name looked up in the node's inputs.
    pub input: String,
    /// Bytes per voxel for image inputs, GB per unit for numeric inputs.
    pub multiplier: f64,
}

impl InputWeight {
    /// Creates a weight.
    pub fn new(input: impl Into<String>, multiplier: f64) -> Self {
        Self {
            input: input.into(),
            multiplier,
        }
    }
}

/// The declaration of an estimator, validated by [`EstimatorPolicy::build`].
///
/// Weights are evaluated in declaration order and the trail follows it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorPolicy {
    /// Inputs that drive memory, in order.
    pub weights: Vec<InputWeight>,
    /// Fixed overhead in GB.
    pub overhead_gb: f64,
    /// Lower clamp in GB; `None` leaves the estimate unbounded below.
    pub min_gb: Option<f64>,
    /// Upper clamp in GB; `None` leaves the estimate unbounded above.
    pub max_gb: Option<f64>,
}

impl Default for EstimatorPolicy {
    fn default() -> Self {
        Self {
            weights: Vec::new(),
            overhead_gb: DEFAULT_OVERHEAD_GB,
            min_gb: Some(DEFAULT_MIN_GB),
            max_gb: Some(DEFAULT_MAX_GB),
        }
    }
}

impl EstimatorPolicy {
    /// A policy with the given weights and default overhead and bounds.
    pub fn new(weights: impl IntoIterator<Item = InputWeight>) -> Self {
        Self {
            weights: weights.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Appends a weight.
    pub fn weight(mut self, input: impl Into<String>, multiplier: f64) -> Self {
        self.weights.push(InputWeight::new(input, multiplier));
        self
    }

    /// Sets the fixed overhead.
    pub fn overhead_gb(mut self, overhead_gb: f64) -> Self {
        self.overhead_gb = overhead_gb;
        self
    }

    /// Sets both clamp bounds.
    pub fn bounds(mut self, min_gb: Option<f64>, max_gb: Option<f64>) -> Self {
        self.min_gb = min_gb;
        self.max_gb = max_gb;
        self
    }

    /// Validates the policy and produces an estimator.
    pub fn build(self) -> Result<ResourceEstimator, EstimateError> {
        let mut seen = BTreeSet::new();
        for weight in &self.weights {
            if !weight.multiplier.is_finite() || weight.multiplier < 0.0 {
                return Err(EstimateError::InvalidMultiplier {
                    input: weight.input.clone(),
                    multiplier: weight.multiplier,
                });
            }
            if !seen.insert(weight.input.as_str()) {
                return Err(EstimateError::DuplicateInput(weight.input.clone()));
            }
        }
        if !self.overhead_gb.is_finite() {
            return Err(EstimateError::InvalidOverhead(self.overhead_gb));
        }
        for (name, bound) in [("min_gb", self.min_gb), ("max_gb", self.max_gb)] {
            if let Some(value) = bound {
                if !value.is_finite() {
                    return Err(EstimateError::InvalidBound { name, value });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_gb, self.max_gb) {
            if min > max {
                return Err(EstimateError::InvertedBounds { min, max });
            }
        }
        Ok(ResourceEstimator { policy: self })
    }
}

/// The result of one estimation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Estimate {
    /// The clamped memory requirement in GB.
    pub memory_gb: f64,
    /// One line per weighted input, then the overhead line and the clamp line.
    pub trail: Vec<String>,
}

impl Estimate {
    /// The trail joined into one line for run reports.
    pub fn report(&self) -> String {
        self.trail.join(TRAIL_SEPARATOR)
    }
}

/// A validated, immutable memory estimator.
///
/// Shared freely between threads; estimation reads only its arguments and
/// the headers of the image files they name.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceEstimator {
    policy: EstimatorPolicy,
}

impl ResourceEstimator {
    /// The declared weights, in order.
    pub fn weights(&self) -> &[InputWeight] {
        &self.policy.weights
    }

    /// The fixed overhead.
    pub fn overhead_gb(&self) -> f64 {
        self.policy.overhead_gb
    }

    /// The lower clamp.
    pub fn min_gb(&self) -> Option<f64> {
        self.policy.min_gb
    }

    /// The upper clamp.
    pub fn max_gb(&self) -> Option<f64> {
        self.policy.max_gb
    }

    /// Estimates memory for `inputs`, reading image headers from disk.
    pub fn estimate<I: InputSource + ?Sized>(&self, inputs: &I) -> Estimate {
        self.estimate_with(inputs, &HeaderVolumeReader)
    }

    /// Estimates memory for `inputs` using `reader` for image dimensions.
    ///
    /// Never fails: an input that cannot be interpreted contributes nothing
    /// and says why in the trail.
    pub fn estimate_with<I: InputSource + ?Sized>(
        &self,
        inputs: &I,
        reader: &dyn VolumeReader,
    ) -> Estimate {
        let mut trail = Vec::with_capacity(self.policy.weights.len() + 2);
        let mut total = 0.0;

        for weight in &self.policy.weights {
            let name = weight.input.as_str();
            let Some(value) = inputs.input(name) else {
                trail.push(format!("{name}: not provided"));
                continue;
            };

            match classify(value) {
                Kind::Undefined => trail.push(format!("{name}: undefined")),
                Kind::Files(paths) => {
                    let (voxels, files) = count_voxels(&paths, reader);
                    if files == 0 {
                        trail.push(format!("{name}: no readable image files"));
                        continue;
                    }
                    let contribution = voxels as f64 * weight.multiplier / BYTES_PER_GB;
                    total += contribution;
                    trail.push(format!(
                        "{name}: {voxels} voxels in {files} file(s) x {} B = {contribution:.3} GB",
                        weight.multiplier
                    ));
                }
                Kind::Numbers(values) => {
                    let sum = values.iter().fold(0.0, |acc, v| acc + v);
                    let contribution = sum * weight.multiplier;
                    total += contribution;
                    trail.push(format!(
                        "{name}: {sum} x {} = {contribution:.3} GB",
                        weight.multiplier
                    ));
                }
                Kind::Unsupported("bool") => trail.push(format!(
                    "{name}: unsupported value type (bool), not counted as 0 or 1"
                )),
                Kind::Unsupported(type_name) => {
                    trail.push(format!("{name}: unsupported value type ({type_name})"));
                }
            }
        }

        let raw = total + self.policy.overhead_gb;
        trail.push(format!(
            "overhead: {} GB, total estimated: {raw:.3} GB",
            self.policy.overhead_gb
        ));
        let memory_gb = clamp(raw, self.policy.min_gb, self.policy.max_gb);
        trail.push(format!(
            "clamped to [{}, {}]: {memory_gb:.3} GB",
            Bound(self.policy.min_gb),
            Bound(self.policy.max_gb)
        ));

        tracing::debug!(raw_gb = raw, memory_gb, "estimated memory");
        Estimate { memory_gb, trail }
    }
}

/// Clamps `value` into the optional bounds: `max(low, min(high, value))`.
pub fn clamp(value: f64, low: Option<f64>, high: Option<f64>) -> f64 {
    let capped = high.map_or(value, |high| value.min(high));
    low.map_or(capped, |low| capped.max(low))
}

struct Bound(Option<f64>);

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("none"),
        }
    }
}

enum Kind<'a> {
    Undefined,
    Files(Vec<&'a str>),
    Numbers(Vec<f64>),
    Unsupported(&'static str),
}

/// Decides how a value contributes.
///
/// One text value or a list containing any text is file-like; the list's
/// non-text elements are ignored. A list of numbers, including the empty
/// list, is numeric.
fn classify(value: &InputValue) -> Kind<'_> {
    match value {
        InputValue::Undefined => Kind::Undefined,
        InputValue::Text(path) => Kind::Files(vec![path.as_str()]),
        InputValue::Number(n) => Kind::Numbers(vec![*n]),
        InputValue::List(items) => {
            let paths: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    InputValue::Text(path) => Some(path.as_str()),
                    _ => None,
                })
                .collect();
            if !paths.is_empty() {
                return Kind::Files(paths);
            }
            let numbers: Option<Vec<f64>> = items
                .iter()
                .map(|item| match item {
                    InputValue::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match numbers {
                Some(numbers) => Kind::Numbers(numbers),
                None => Kind::Unsupported("list"),
            }
        }
        other => Kind::Unsupported(other.type_name()),
    }
}

/// Sums spatial voxels over the paths that exist and have a readable header.
fn count_voxels(paths: &[&str], reader: &dyn VolumeReader) -> (u64, usize) {
    let mut voxels = 0u64;
    let mut files = 0usize;
    for path in paths.iter().map(Path::new) {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "estimator input does not exist");
            continue;
        }
        match reader.spatial_voxels(path) {
            Ok(count) => {
                voxels = voxels.saturating_add(count);
                files += 1;
            }
            Err(err) => tracing::debug!(error = %err, "skipping unreadable image"),
        }
    }
    (voxels, files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VolumeError;
    use crate::value::Inputs;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Answers from a fixed table; paths not in it are unreadable.
    struct FixedVolumes(HashMap<PathBuf, u64>);

    impl VolumeReader for FixedVolumes {
        fn spatial_voxels(&self, path: &Path) -> Result<u64, VolumeError> {
            self.0
                .get(path)
                .copied()
                .ok_or_else(|| VolumeError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
        }
    }

    fn inputs<const N: usize>(pairs: [(&str, InputValue); N]) -> Inputs {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn numeric_inputs_unbounded() {
        let estimator = EstimatorPolicy::new([InputWeight::new("sizes", 0.01)])
            .overhead_gb(0.2)
            .bounds(None, None)
            .build()
            .unwrap();
        let estimate = estimator.estimate(&inputs([("sizes", vec![50.0, 50.0].into())]));
        assert!((estimate.memory_gb - 1.2).abs() < 1e-9);
    }

    #[test]
    fn empty_weights_give_clamped_overhead() {
        let estimator = EstimatorPolicy::default().build().unwrap();
        let estimate = estimator.estimate(&Inputs::new());
        assert_eq!(estimate.memory_gb, DEFAULT_MIN_GB);
        assert_eq!(estimate.trail.len(), 2);
    }

    #[test]
    fn trail_follows_declaration_order() {
        let estimator = EstimatorPolicy::default()
            .weight("b", 1.0)
            .weight("a", 1.0)
            .weight("c", 1.0)
            .build()
            .unwrap();
        let estimate = estimator.estimate(&inputs([
            ("a", InputValue::Undefined),
            ("c", InputValue::Bool(true)),
        ]));
        assert_eq!(estimate.trail.len(), 5);
        assert_eq!(estimate.trail[0], "b: not provided");
        assert_eq!(estimate.trail[1], "a: undefined");
        assert_eq!(
            estimate.trail[2],
            "c: unsupported value type (bool), not counted as 0 or 1"
        );
        assert!(estimate.trail[3].starts_with("overhead: 0.3 GB"));
        assert!(estimate.trail[4].starts_with("clamped to [0.5, 8]"));
        assert_eq!(estimate.memory_gb, 0.5);
    }

    #[test]
    fn report_joins_trail() {
        let estimator = EstimatorPolicy::default().weight("n", 1.0).build().unwrap();
        let estimate = estimator.estimate(&inputs([("n", 2.0.into())]));
        let report = estimate.report();
        assert_eq!(report.split(TRAIL_SEPARATOR).count(), 3);
        assert!(report.starts_with("n: 2 x 1 = 2.000 GB"));
        assert!((estimate.memory_gb - 2.3).abs() < 1e-9);
    }

    #[test]
    fn upper_bound_caps_estimate() {
        let estimator = EstimatorPolicy::default().weight("n", 1.0).build().unwrap();
        let estimate = estimator.estimate(&inputs([("n", 100.0.into())]));
        assert_eq!(estimate.memory_gb, DEFAULT_MAX_GB);
    }

    #[test]
    fn file_contribution_uses_voxels() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.nii");
        let b = dir.path().join("b.nii");
        std::fs::write(&a, b"").unwrap();
        std::fs::write(&b, b"").unwrap();
        let reader = FixedVolumes(HashMap::from([(a.clone(), 1 << 29), (b.clone(), 1 << 29)]));

        let estimator = EstimatorPolicy::default()
            .weight("in_files", 2.0)
            .overhead_gb(0.0)
            .bounds(None, None)
            .build()
            .unwrap();
        let estimate =
            estimator.estimate_with(&inputs([("in_files", InputValue::paths([&a, &b]))]), &reader);
        assert!((estimate.memory_gb - 2.0).abs() < 1e-9);
        assert!(estimate.trail[0].contains("in 2 file(s)"));
    }

    #[test]
    fn unreadable_and_missing_files_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.nii");
        let bad = dir.path().join("bad.nii");
        std::fs::write(&good, b"").unwrap();
        std::fs::write(&bad, b"").unwrap();
        let reader = FixedVolumes(HashMap::from([(good.clone(), 1 << 30)]));

        let estimator = EstimatorPolicy::default()
            .weight("in_files", 1.0)
            .overhead_gb(0.0)
            .bounds(None, None)
            .build()
            .unwrap();
        let value = InputValue::List(vec![
            InputValue::Text(good.to_string_lossy().into_owned()),
            InputValue::Text(bad.to_string_lossy().into_owned()),
            InputValue::Text(dir.path().join("absent.nii").to_string_lossy().into_owned()),
            InputValue::Number(7.0),
        ]);
        let estimate = estimator.estimate_with(&inputs([("in_files", value)]), &reader);
        assert!((estimate.memory_gb - 1.0).abs() < 1e-9);
        assert!(estimate.trail[0].contains("in 1 file(s)"));
    }

    #[test]
    fn no_readable_files_contributes_nothing() {
        let estimator = EstimatorPolicy::default()
            .weight("in_file", 1.0)
            .bounds(None, None)
            .build()
            .unwrap();
        let estimate = estimator.estimate_with(
            &inputs([("in_file", "/nonexistent/T1.nii".into())]),
            &FixedVolumes(HashMap::new()),
        );
        assert_eq!(estimate.trail[0], "in_file: no readable image files");
        assert!((estimate.memory_gb - DEFAULT_OVERHEAD_GB).abs() < 1e-9);
    }

    #[test]
    fn empty_list_is_numeric_zero() {
        let estimator = EstimatorPolicy::default()
            .weight("n", 5.0)
            .bounds(None, None)
            .build()
            .unwrap();
        let estimate = estimator.estimate(&inputs([("n", InputValue::List(Vec::new()))]));
        assert!(estimate.trail[0].starts_with("n: 0 x 5"));
        assert!((estimate.memory_gb - DEFAULT_OVERHEAD_GB).abs() < 1e-9);
    }

    #[test]
    fn nested_list_is_unsupported() {
        let estimator = EstimatorPolicy::default().weight("n", 1.0).build().unwrap();
        let value = InputValue::List(vec![InputValue::List(vec![1.0.into()])]);
        let estimate = estimator.estimate(&inputs([("n", value)]));
        assert_eq!(estimate.trail[0], "n: unsupported value type (list)");
    }

    #[test]
    fn estimate_is_monotonic_in_numeric_input() {
        let estimator = EstimatorPolicy::default().weight("n", 0.5).build().unwrap();
        let mut previous = f64::NEG_INFINITY;
        for step in 0..40 {
            let value = f64::from(step) * 0.5;
            let estimate = estimator.estimate(&inputs([("n", value.into())]));
            assert!(estimate.memory_gb >= previous);
            assert!(estimate.memory_gb >= DEFAULT_MIN_GB);
            assert!(estimate.memory_gb <= DEFAULT_MAX_GB);
            previous = estimate.memory_gb;
        }
    }

    #[test]
    fn rejects_negative_multiplier() {
        let err = EstimatorPolicy::default()
            .weight("n", -1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, EstimateError::InvalidMultiplier { .. }));
    }

    #[test]
    fn rejects_nan_multiplier() {
        let err = EstimatorPolicy::default()
            .weight("n", f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, EstimateError::InvalidMultiplier { .. }));
    }

    #[test]
    fn rejects_duplicate_input() {
        let err = EstimatorPolicy::default()
            .weight("n", 1.0)
            .weight("n", 2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, EstimateError::DuplicateInput(name) if name == "n"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = EstimatorPolicy::default()
            .bounds(Some(4.0), Some(1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, EstimateError::InvertedBounds { .. }));
    }

    #[test]
    fn rejects_infinite_overhead_and_bound() {
        assert!(matches!(
            EstimatorPolicy::default()
                .overhead_gb(f64::INFINITY)
                .build()
                .unwrap_err(),
            EstimateError::InvalidOverhead(_)
        ));
        assert!(matches!(
            EstimatorPolicy::default()
                .bounds(None, Some(f64::INFINITY))
                .build()
                .unwrap_err(),
            EstimateError::InvalidBound { name: "max_gb", .. }
        ));
    }

    #[test]
    fn clamp_respects_missing_bounds() {
        assert_eq!(clamp(10.0, None, None), 10.0);
        assert_eq!(clamp(10.0, Some(1.0), None), 10.0);
        assert_eq!(clamp(0.1, Some(1.0), None), 1.0);
        assert_eq!(clamp(10.0, None, Some(2.0)), 2.0);
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: EstimatorPolicy =
            serde_json::from_str(r#"{"weights": [{"input": "in_file", "multiplier": 4}]}"#)
                .unwrap();
        assert_eq!(policy.weights, vec![InputWeight::new("in_file", 4.0)]);
        assert_eq!(policy.overhead_gb, DEFAULT_OVERHEAD_GB);
        assert_eq!(policy.max_gb, Some(DEFAULT_MAX_GB));
    }
}
