//! Refactoring miner: diff → classify → report
//!
//! One `RefactoringMiner` can serve many comparisons; nothing is cached
//! between runs.

use super::ports::FrontEnd;
use super::result::{MinedSnapshots, MiningResult};
use super::snapshot::SourceSnapshot;
use crate::config::MinerConfig;
use crate::errors::{MinerError, Result};
use crate::features::model_diff::{ModelDiffer, RenameHints};
use crate::features::refactoring::{build_report, Refactoring, RefactoringDetector, RefactoringReport};
use crate::shared::models::Model;
use crate::shared::CancellationToken;
use std::time::Instant;
use tracing::{info, warn};

/// Use case boundary for callers that hold both models already
pub trait RefactoringDetectionUseCase: Send + Sync {
    fn detect(
        &self,
        before: &Model,
        after: &Model,
        hints: &RenameHints,
        cancel: &CancellationToken,
    ) -> Result<MiningResult>;
}

pub struct RefactoringMiner {
    config: MinerConfig,
    differ: ModelDiffer,
    detector: RefactoringDetector,
    pool: Option<rayon::ThreadPool>,
}

impl RefactoringMiner {
    pub fn new(config: MinerConfig) -> Self {
        let differ = ModelDiffer::new(
            config.matcher.clone(),
            config.mapper.clone(),
            config.parallel.enabled,
        );
        let detector = RefactoringDetector::new(config.classifier.clone());
        let pool = if config.parallel.enabled && config.parallel.num_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallel.num_threads)
                .thread_name(|i| format!("refminer-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!(error = %err, "Dedicated thread pool unavailable, using the global pool");
                    None
                }
            }
        } else {
            None
        };
        Self {
            config,
            differ,
            detector,
            pool,
        }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Parse both sides with `front_end`, then detect
    pub fn detect_sources<F: FrontEnd>(
        &self,
        front_end: &F,
        snapshot: &SourceSnapshot,
        cancel: &CancellationToken,
    ) -> Result<MinedSnapshots> {
        let mut skipped = Vec::new();
        let (before, after) = self.install(|| {
            let before = snapshot.build_model(front_end, &snapshot.before, &mut skipped);
            let after = snapshot.build_model(front_end, &snapshot.after, &mut skipped);
            (before, after)
        });
        skipped.sort();
        skipped.dedup();
        info!(
            before_types = before.len(),
            after_types = after.len(),
            skipped = skipped.len(),
            "Models built"
        );

        let mut result = self.detect_models(&before, &after, &snapshot.rename_hints, cancel)?;
        result.skipped_files = skipped;
        Ok(MinedSnapshots { before, after, result })
    }

    fn detect_models(
        &self,
        before: &Model,
        after: &Model,
        hints: &RenameHints,
        cancel: &CancellationToken,
    ) -> Result<MiningResult> {
        if cancel.is_cancelled() {
            return Err(MinerError::Cancelled);
        }
        self.install(|| self.run(before, after, hints, cancel))
    }

    /// Run `job` on the dedicated pool when there is one
    fn install<R: Send>(&self, job: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    fn run(
        &self,
        before: &Model,
        after: &Model,
        hints: &RenameHints,
        cancel: &CancellationToken,
    ) -> Result<MiningResult> {
        let start = Instant::now();
        info!(
            before_types = before.len(),
            after_types = after.len(),
            threads = self.config.parallel.effective_threads(),
            "Refactoring detection started"
        );

        let mut diff = self.differ.diff(before, after, hints, cancel);
        let refactorings = self
            .detector
            .detect(before, after, &mut diff, self.differ.mapper(), cancel)?;

        let mut paired: Vec<(Refactoring, RefactoringReport)> = refactorings
            .into_iter()
            .map(|r| {
                let report = build_report(&r, before, after);
                (r, report)
            })
            .collect();
        paired.sort_by(|a, b| a.1.report_order(&b.1));
        let (refactorings, reports): (Vec<Refactoring>, Vec<RefactoringReport>) = paired.into_iter().unzip();

        let cancelled = diff.cancelled || cancel.is_cancelled();
        if cancelled {
            warn!(found = refactorings.len(), "Detection cancelled, returning partial results");
        }
        let degraded_mappings = diff.degraded_mappings();
        info!(
            refactorings = refactorings.len(),
            degraded_mappings,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Refactoring detection finished"
        );
        Ok(MiningResult {
            refactorings,
            reports,
            diff,
            skipped_files: Vec::new(),
            cancelled,
            degraded_mappings,
        })
    }
}

impl RefactoringDetectionUseCase for RefactoringMiner {
    fn detect(
        &self,
        before: &Model,
        after: &Model,
        hints: &RenameHints,
        cancel: &CancellationToken,
    ) -> Result<MiningResult> {
        self.detect_models(before, after, hints, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::features::refactoring::RefactoringKind;
    use crate::pipeline::FrontEndError;
    use crate::shared::models::builders::{OperationBuilder, TypeBuilder};
    use crate::shared::models::TypeDeclaration;

    fn models() -> (Model, Model) {
        let before = Model::new(vec![TypeBuilder::new("a.Clock")
            .operation(OperationBuilder::new("now").returns("int").build())
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Clock")
            .operation(OperationBuilder::new("now").returns("long").build())
            .build()]);
        (before, after)
    }

    #[test]
    fn test_detect_change_return_type() {
        let (before, after) = models();
        let miner = RefactoringMiner::new(MinerConfig::default());
        let result = miner
            .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.refactorings.len(), 1);
        assert_eq!(result.reports[0].kind, RefactoringKind::ChangeReturnType);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_dedicated_pool() {
        let (before, after) = models();
        let config = MinerConfig::preset(Preset::Balanced)
            .parallel(|c| c.num_threads(2))
            .build()
            .unwrap();
        let miner = RefactoringMiner::new(config);
        assert!(miner.pool.is_some());
        let result = miner
            .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.refactorings.len(), 1);
    }

    /// Records the rayon pool size seen by each parse call
    struct PoolRecordingFrontEnd {
        seen: std::sync::Mutex<Vec<usize>>,
    }

    impl FrontEnd for PoolRecordingFrontEnd {
        fn parse(&self, path: &str, _source: &str) -> std::result::Result<Vec<TypeDeclaration>, FrontEndError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(rayon::current_num_threads());
            }
            Ok(vec![TypeBuilder::new("a.Clock").file(path).build()])
        }
    }

    #[test]
    fn test_parsing_runs_on_dedicated_pool() {
        let config = MinerConfig::preset(Preset::Balanced)
            .parallel(|c| c.num_threads(3))
            .build()
            .unwrap();
        let miner = RefactoringMiner::new(config);
        let front_end = PoolRecordingFrontEnd {
            seen: std::sync::Mutex::new(Vec::new()),
        };
        let snapshot = SourceSnapshot::new()
            .before_file("src/a/Clock.java", "class")
            .after_file("src/a/Clock.java", "class");
        miner
            .detect_sources(&front_end, &snapshot, &CancellationToken::new())
            .unwrap();
        let seen = front_end.seen.lock().unwrap();
        assert_eq!(*seen, vec![3, 3]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (before, after) = models();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let miner = RefactoringMiner::new(MinerConfig::default());
        let err = miner
            .detect(&before, &after, &RenameHints::new(), &cancel)
            .unwrap_err();
        assert!(matches!(err, MinerError::Cancelled));
    }
}
