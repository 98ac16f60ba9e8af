//! Stage-specific configuration types
//!
//! Each engine stage has its own configuration struct with validation.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::{check_count, check_ratio, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Declaration Matcher Configuration
// ============================================================================

/// Declaration matcher (model diff) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Member overlap needed for a type moved to another package (0.0..=1.0)
    pub move_type_threshold: f64,

    /// Member overlap needed for a type renamed in place (0.0..=1.0)
    pub rename_type_threshold: f64,

    /// Member overlap needed when both package and simple name change (0.0..=1.0)
    pub move_rename_type_threshold: f64,

    /// Member overlap needed when the file rename hints pair the two types (0.0..=1.0)
    pub rename_hint_threshold: f64,

    /// Name similarity floor used by the name-only fallback (0.0..=1.0)
    pub name_similarity_floor: f64,

    /// Allowed distance between log2 statement-count buckets (0..=16)
    pub bucket_tolerance: u32,

    /// Unmatched operation pairs per type before falling back to name-only pairing (1..=1000000)
    pub max_candidate_pairs: usize,

    /// Body coverage required for an operation moved between types (0.0..=1.0)
    pub move_operation_coverage: f64,

    /// Weight of body-mapping coverage in the operation pair score (0.0..=1.0)
    pub body_weight: f64,

    /// Weight of name edit similarity in the operation pair score (0.0..=1.0)
    pub name_weight: f64,

    /// Weight of parameter list overlap in the operation pair score (0.0..=1.0)
    pub parameter_weight: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl MatcherConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let base = Self {
            move_type_threshold: 0.4,
            rename_type_threshold: 0.6,
            move_rename_type_threshold: 0.75,
            rename_hint_threshold: 0.2,
            name_similarity_floor: 0.6,
            bucket_tolerance: 2,
            max_candidate_pairs: 400,
            move_operation_coverage: 0.6,
            body_weight: 0.6,
            name_weight: 0.25,
            parameter_weight: 0.15,
        };
        match preset {
            Preset::Fast => Self {
                bucket_tolerance: 1,
                max_candidate_pairs: 100,
                ..base
            },
            Preset::Thorough => Self {
                bucket_tolerance: 3,
                max_candidate_pairs: 2500,
                move_operation_coverage: 0.5,
                ..base
            },
            Preset::Balanced | Preset::Custom => base,
        }
    }

    pub fn move_type_threshold(mut self, v: f64) -> Self {
        self.move_type_threshold = v;
        self
    }

    pub fn rename_type_threshold(mut self, v: f64) -> Self {
        self.rename_type_threshold = v;
        self
    }

    pub fn bucket_tolerance(mut self, v: u32) -> Self {
        self.bucket_tolerance = v;
        self
    }

    pub fn max_candidate_pairs(mut self, v: usize) -> Self {
        self.max_candidate_pairs = v;
        self
    }

    pub fn move_operation_coverage(mut self, v: f64) -> Self {
        self.move_operation_coverage = v;
        self
    }

    pub fn weights(mut self, body: f64, name: f64, parameter: f64) -> Self {
        self.body_weight = body;
        self.name_weight = name;
        self.parameter_weight = parameter;
        self
    }

    /// Weighted operation pair score; `body` is `None` when no mapping was run
    pub fn pair_score(&self, body: Option<f64>, name: f64, parameter: f64) -> f64 {
        match body {
            Some(coverage) => {
                self.body_weight * coverage + self.name_weight * name + self.parameter_weight * parameter
            }
            None => {
                let total = self.name_weight + self.parameter_weight;
                if total == 0.0 {
                    name
                } else {
                    (self.name_weight * name + self.parameter_weight * parameter) / total
                }
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_ratio(
            "move_type_threshold",
            self.move_type_threshold,
            "Member overlap is a ratio",
        )?;
        check_ratio(
            "rename_type_threshold",
            self.rename_type_threshold,
            "Member overlap is a ratio",
        )?;
        check_ratio(
            "move_rename_type_threshold",
            self.move_rename_type_threshold,
            "Member overlap is a ratio",
        )?;
        check_ratio(
            "rename_hint_threshold",
            self.rename_hint_threshold,
            "Member overlap is a ratio",
        )?;
        check_ratio(
            "name_similarity_floor",
            self.name_similarity_floor,
            "Normalized edit similarity is a ratio",
        )?;
        check_count(
            "bucket_tolerance",
            self.bucket_tolerance as usize,
            0,
            16,
            "Buckets are log2 of the statement count",
        )?;
        check_count(
            "max_candidate_pairs",
            self.max_candidate_pairs,
            1,
            1_000_000,
            "Candidate pair limit must be finite",
        )?;
        check_ratio(
            "move_operation_coverage",
            self.move_operation_coverage,
            "Coverage is a ratio",
        )?;
        check_ratio("body_weight", self.body_weight, "Weights are ratios")?;
        check_ratio("name_weight", self.name_weight, "Weights are ratios")?;
        check_ratio("parameter_weight", self.parameter_weight, "Weights are ratios")?;
        let sum = self.body_weight + self.name_weight + self.parameter_weight;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Validation(format!(
                "operation pair weights must sum to 1.0, got {:.3}",
                sum
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Body Mapper Configuration
// ============================================================================

/// Statement/expression body mapper configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Minimum token similarity for the replacement pass (0.0..=1.0)
    pub similarity_floor: f64,

    /// Statement pairs per mapper run before degrading to exact matching (1..=100000000)
    pub max_pair_comparisons: usize,

    /// Wall-clock budget per mapper run in milliseconds (0 = unlimited)
    pub time_budget_ms: u64,

    /// Token count above which alignment falls back to bag-of-tokens scoring (8..=100000)
    pub max_alignment_tokens: usize,

    /// Exact duplicates of one statement that may spawn separate mapper instances (1..=64)
    pub duplicate_candidate_limit: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl MapperConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                similarity_floor: 0.6,
                max_pair_comparisons: 40_000,
                time_budget_ms: 500,
                max_alignment_tokens: 200,
                duplicate_candidate_limit: 2,
            },
            Preset::Balanced | Preset::Custom => Self {
                similarity_floor: 0.5,
                max_pair_comparisons: 250_000,
                time_budget_ms: 5_000,
                max_alignment_tokens: 400,
                duplicate_candidate_limit: 4,
            },
            Preset::Thorough => Self {
                similarity_floor: 0.45,
                max_pair_comparisons: 2_000_000,
                time_budget_ms: 30_000,
                max_alignment_tokens: 1_000,
                duplicate_candidate_limit: 8,
            },
        }
    }

    pub fn similarity_floor(mut self, v: f64) -> Self {
        self.similarity_floor = v;
        self
    }

    pub fn max_pair_comparisons(mut self, v: usize) -> Self {
        self.max_pair_comparisons = v;
        self
    }

    pub fn time_budget_ms(mut self, v: u64) -> Self {
        self.time_budget_ms = v;
        self
    }

    pub fn max_alignment_tokens(mut self, v: usize) -> Self {
        self.max_alignment_tokens = v;
        self
    }

    pub fn duplicate_candidate_limit(mut self, v: usize) -> Self {
        self.duplicate_candidate_limit = v;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_ratio(
            "similarity_floor",
            self.similarity_floor,
            "Token similarity is a ratio",
        )?;
        check_count(
            "max_pair_comparisons",
            self.max_pair_comparisons,
            1,
            100_000_000,
            "Pair budget must be finite",
        )?;
        check_count(
            "max_alignment_tokens",
            self.max_alignment_tokens,
            8,
            100_000,
            "Alignment is quadratic in token count",
        )?;
        check_count(
            "duplicate_candidate_limit",
            self.duplicate_candidate_limit,
            1,
            64,
            "Each duplicate spawns a mapper instance",
        )
    }
}

// ============================================================================
// Refactoring Classifier Configuration
// ============================================================================

/// Refactoring classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Body coverage a matched pair needs to be reported as renamed or moved (0.0..=1.0)
    pub rename_move_coverage: f64,

    /// Fraction of the extracted operation's statements that must be mapped (0.0..=1.0)
    pub extract_coverage: f64,

    /// Fraction of the inlined operation's statements that must be mapped (0.0..=1.0)
    pub inline_coverage: f64,

    /// Union coverage required on both sides of a merge or split (0.0..=1.0)
    pub merge_split_coverage: f64,

    /// Minimum moved statements for a Move Code refactoring (1..=1000)
    pub move_code_min_statements: usize,

    /// Maximum depth of nested extraction chains (1..=32)
    pub max_extract_depth: usize,

    /// Detect parameterized tests
    pub detect_parameterize_test: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl ClassifierConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let base = Self {
            rename_move_coverage: 0.5,
            extract_coverage: 0.5,
            inline_coverage: 0.5,
            merge_split_coverage: 0.9,
            move_code_min_statements: 2,
            max_extract_depth: 4,
            detect_parameterize_test: true,
        };
        match preset {
            Preset::Fast => Self {
                max_extract_depth: 2,
                detect_parameterize_test: false,
                ..base
            },
            Preset::Thorough => Self {
                max_extract_depth: 8,
                ..base
            },
            Preset::Balanced | Preset::Custom => base,
        }
    }

    pub fn rename_move_coverage(mut self, v: f64) -> Self {
        self.rename_move_coverage = v;
        self
    }

    pub fn extract_coverage(mut self, v: f64) -> Self {
        self.extract_coverage = v;
        self
    }

    pub fn inline_coverage(mut self, v: f64) -> Self {
        self.inline_coverage = v;
        self
    }

    pub fn merge_split_coverage(mut self, v: f64) -> Self {
        self.merge_split_coverage = v;
        self
    }

    pub fn max_extract_depth(mut self, v: usize) -> Self {
        self.max_extract_depth = v;
        self
    }

    pub fn detect_parameterize_test(mut self, v: bool) -> Self {
        self.detect_parameterize_test = v;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_ratio(
            "rename_move_coverage",
            self.rename_move_coverage,
            "Coverage is a ratio",
        )?;
        check_ratio("extract_coverage", self.extract_coverage, "Coverage is a ratio")?;
        check_ratio("inline_coverage", self.inline_coverage, "Coverage is a ratio")?;
        check_ratio(
            "merge_split_coverage",
            self.merge_split_coverage,
            "Coverage is a ratio",
        )?;
        check_count(
            "move_code_min_statements",
            self.move_code_min_statements,
            1,
            1000,
            "Move Code needs at least one statement",
        )?;
        check_count(
            "max_extract_depth",
            self.max_extract_depth,
            1,
            32,
            "Nested extraction chains are shallow in practice",
        )
    }
}

// ============================================================================
// Parallel Processing Configuration
// ============================================================================

/// Parallel processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Run type pairs and speculative mappings on the rayon pool
    pub enabled: bool,

    /// Worker threads (0 = rayon global pool, 1..=256 = dedicated pool)
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl ParallelConfig {
    pub fn from_preset(_preset: Preset) -> Self {
        Self {
            enabled: true,
            num_threads: 0,
        }
    }

    pub fn enabled(mut self, v: bool) -> Self {
        self.enabled = v;
        self
    }

    pub fn num_threads(mut self, v: usize) -> Self {
        self.num_threads = v;
        self
    }

    /// Effective worker count
    pub fn effective_threads(&self) -> usize {
        if !self.enabled {
            1
        } else if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_count(
            "num_threads",
            self.num_threads,
            0,
            256,
            "Use 0 for the default pool",
        )
    }
}

impl Validatable for MatcherConfig {
    fn validate(&self) -> ConfigResult<()> {
        MatcherConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "MatcherConfig"
    }
}

impl Validatable for MapperConfig {
    fn validate(&self) -> ConfigResult<()> {
        MapperConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "MapperConfig"
    }
}

impl Validatable for ClassifierConfig {
    fn validate(&self) -> ConfigResult<()> {
        ClassifierConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "ClassifierConfig"
    }
}

impl Validatable for ParallelConfig {
    fn validate(&self) -> ConfigResult<()> {
        ParallelConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "ParallelConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough, Preset::Custom] {
            assert!(MatcherConfig::from_preset(preset).validate().is_ok());
            assert!(MapperConfig::from_preset(preset).validate().is_ok());
            assert!(ClassifierConfig::from_preset(preset).validate().is_ok());
            assert!(ParallelConfig::from_preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_mapper_floor_out_of_range() {
        let cfg = MapperConfig::default().similarity_floor(1.2);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Range { ref field, .. } if field == "similarity_floor"));
    }

    #[test]
    fn test_fast_preset_is_cheaper() {
        let fast = MapperConfig::from_preset(Preset::Fast);
        let thorough = MapperConfig::from_preset(Preset::Thorough);
        assert!(fast.max_pair_comparisons < thorough.max_pair_comparisons);
        assert!(fast.time_budget_ms < thorough.time_budget_ms);
    }

    #[test]
    fn test_matcher_weights_must_sum_to_one() {
        let cfg = MatcherConfig::default().weights(0.5, 0.5, 0.5);
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
        let cfg = MatcherConfig::default().weights(1.0, 0.0, 0.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_pair_score_without_body_renormalizes() {
        let cfg = MatcherConfig::default();
        assert!((cfg.pair_score(None, 1.0, 1.0) - 1.0).abs() < 1e-9);
        assert!(cfg.pair_score(Some(1.0), 0.0, 0.0) < 1.0);
    }

    #[test]
    fn test_disabled_parallel_uses_one_thread() {
        let cfg = ParallelConfig::default().enabled(false).num_threads(8);
        assert_eq!(cfg.effective_threads(), 1);
        assert_eq!(ParallelConfig::default().num_threads(3).effective_threads(), 3);
    }
}
