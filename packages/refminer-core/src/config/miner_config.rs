//! Top-level engine configuration with builder overrides and YAML loading

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::provenance::{ConfigProvenance, ConfigSource};
use super::stage_configs::{ClassifierConfig, MapperConfig, MatcherConfig, ParallelConfig};
use super::validation::Validatable;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub preset: Preset,
    pub matcher: MatcherConfig,
    pub mapper: MapperConfig,
    pub classifier: ClassifierConfig,
    pub parallel: ParallelConfig,
    pub provenance: ConfigProvenance,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl MinerConfig {
    /// Level 1: start from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            matcher: MatcherConfig::from_preset(preset),
            mapper: MapperConfig::from_preset(preset),
            classifier: ClassifierConfig::from_preset(preset),
            parallel: ParallelConfig::from_preset(preset),
            provenance: ConfigProvenance::from_preset(preset),
        }
    }

    /// Level 2: override the declaration matcher stage
    pub fn matcher<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MatcherConfig) -> MatcherConfig,
    {
        self.matcher = f(self.matcher);
        self.provenance
            .track_field("matcher.*", ConfigSource::Builder);
        self
    }

    /// Level 2: override the body mapper stage
    pub fn mapper<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MapperConfig) -> MapperConfig,
    {
        self.mapper = f(self.mapper);
        self.provenance.track_field("mapper.*", ConfigSource::Builder);
        self
    }

    /// Level 2: override the refactoring classifier stage
    pub fn classifier<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ClassifierConfig) -> ClassifierConfig,
    {
        self.classifier = f(self.classifier);
        self.provenance
            .track_field("classifier.*", ConfigSource::Builder);
        self
    }

    /// Level 2: override parallelism
    pub fn parallel<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ParallelConfig) -> ParallelConfig,
    {
        self.parallel = f(self.parallel);
        self.provenance
            .track_field("parallel.*", ConfigSource::Builder);
        self
    }

    /// Validate every stage and return the finished config
    pub fn build(self) -> ConfigResult<Self> {
        let stages: [&dyn Validatable; 4] =
            [&self.matcher, &self.mapper, &self.classifier, &self.parallel];
        for stage in stages {
            stage.validate()?;
        }
        if self.matcher.rename_hint_threshold > self.matcher.move_type_threshold {
            return Err(ConfigError::Validation(
                "rename_hint_threshold must not exceed move_type_threshold".to_string(),
            ));
        }
        Ok(self)
    }

    /// Level 3: load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str_with_source(&content, &path.display().to_string())
    }

    /// Level 3: load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::from_yaml_str_with_source(content, "<inline>")
    }

    fn from_yaml_str_with_source(content: &str, source: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        if export.version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: vec![1],
            });
        }

        let preset = Preset::from_str(&export.preset)
            .map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;

        let mut config = Self::preset(preset);
        let yaml = || ConfigSource::Yaml {
            path: source.to_string(),
        };

        if let Some(overrides) = export.overrides {
            if let Some(matcher) = overrides.matcher {
                config.matcher = matcher;
                config.provenance.track_field("matcher.*", yaml());
            }
            if let Some(mapper) = overrides.mapper {
                config.mapper = mapper;
                config.provenance.track_field("mapper.*", yaml());
            }
            if let Some(classifier) = overrides.classifier {
                config.classifier = classifier;
                config.provenance.track_field("classifier.*", yaml());
            }
            if let Some(parallel) = overrides.parallel {
                config.parallel = parallel;
                config.provenance.track_field("parallel.*", yaml());
            }
        }

        config.build()
    }

    /// Export as YAML (schema v1, every stage written as an override)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: self.preset.as_str().to_string(),
            overrides: Some(ConfigOverrides {
                matcher: Some(self.matcher.clone()),
                mapper: Some(self.mapper.clone()),
                classifier: Some(self.classifier.clone()),
                parallel: Some(self.parallel.clone()),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}
