//! Field-level provenance: where each stage setting came from

use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Origin of a configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Preset(Preset),
    Yaml { path: String },
    Builder,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigProvenance {
    fields: BTreeMap<String, ConfigSource>,
}

impl ConfigProvenance {
    pub fn from_preset(preset: Preset) -> Self {
        let mut fields = BTreeMap::new();
        for stage in ["matcher", "mapper", "classifier", "parallel"] {
            fields.insert(format!("{}.*", stage), ConfigSource::Preset(preset));
        }
        Self { fields }
    }

    pub fn track_field(&mut self, field: &str, source: ConfigSource) {
        self.fields.insert(field.to_string(), source);
    }

    pub fn source_of(&self, field: &str) -> Option<&ConfigSource> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigSource)> {
        self.fields.iter()
    }
}
