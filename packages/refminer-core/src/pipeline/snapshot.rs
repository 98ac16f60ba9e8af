//! Source-level input: two file maps plus scoping

use super::ports::FrontEnd;
use crate::features::model_diff::RenameHints;
use crate::shared::models::{Model, TypeDeclaration};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Before/after source texts keyed by file path
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    pub before: BTreeMap<String, String>,
    pub after: BTreeMap<String, String>,
    /// Old path → new path
    pub rename_hints: RenameHints,
    /// Directory roots that participate; empty means every file
    pub roots: Vec<String>,
}

/// A file the front end could not turn into declarations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

impl SourceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.before.insert(path.into(), source.into());
        self
    }

    pub fn after_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.after.insert(path.into(), source.into());
        self
    }

    pub fn rename_hint(mut self, old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        self.rename_hints.insert(old_path.into(), new_path.into());
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// True when `path` lies under one of the roots (or there are none)
    pub fn in_scope(&self, path: &str) -> bool {
        self.roots.is_empty()
            || self.roots.iter().any(|root| {
                let root = root.trim_end_matches('/');
                root.is_empty()
                    || path == root
                    || (path.starts_with(root) && path.as_bytes().get(root.len()) == Some(&b'/'))
            })
    }

    /// Parse one side into a model; failures are appended to `skipped`
    pub(crate) fn build_model<F: FrontEnd>(
        &self,
        front_end: &F,
        files: &BTreeMap<String, String>,
        skipped: &mut Vec<SkippedFile>,
    ) -> Model {
        let in_scope: Vec<(&String, &String)> = files.iter().filter(|(path, _)| self.in_scope(path)).collect();
        let parsed: Vec<(&String, Result<Vec<TypeDeclaration>, _>)> = in_scope
            .par_iter()
            .map(|(path, source)| (*path, front_end.parse(path, source)))
            .collect();

        let mut types = Vec::new();
        for (path, outcome) in parsed {
            match outcome {
                Ok(decls) => types.extend(decls.into_iter().map(|mut decl| {
                    if decl.file_path.is_empty() {
                        decl.file_path = path.clone();
                    }
                    decl
                })),
                Err(err) => {
                    warn!(path = %path, error = %err, "Skipping file");
                    skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Model::new(types)
    }
}
