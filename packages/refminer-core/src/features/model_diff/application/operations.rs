//! Operation matching: exact signatures, then speculative body mapping

use crate::config::MatcherConfig;
use crate::features::body_mapper::{BodyMapper, BodyMapping};
use crate::features::model_diff::domain::OperationMatchKind;
use crate::features::model_diff::infrastructure::prefilter::{
    buckets_compatible, name_similarity, parameter_similarity, signature_distance,
};
use crate::shared::models::{Model, OperationRef, TypeRef};
use crate::shared::CancellationToken;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use tracing::debug;

/// A match whose mapping has not been moved into the arena yet
pub(super) struct LocalMatch {
    pub before: OperationRef,
    pub after: OperationRef,
    pub kind: OperationMatchKind,
    pub score: f64,
    pub mapping: Option<BodyMapping>,
}

pub(super) struct PairOutcome {
    pub matches: Vec<LocalMatch>,
    pub removed: Vec<OperationRef>,
    pub added: Vec<OperationRef>,
    pub cancelled: bool,
}

/// Which leftover pairs a speculative round may consider
pub(super) struct LeftoverPolicy<'p> {
    pub kind: OperationMatchKind,
    pub min_coverage: f64,
    /// Bodiless operations pair by identical name
    pub pair_bodiless: bool,
    pub skip: &'p (dyn Fn(OperationRef, OperationRef) -> bool + Sync),
}

struct Scored {
    before: OperationRef,
    after: OperationRef,
    order: (usize, usize),
    coverage: f64,
    signature_distance: usize,
    score: f64,
    mapping: Option<BodyMapping>,
}

pub(super) struct OperationMatcher<'c> {
    config: &'c MatcherConfig,
    mapper: &'c BodyMapper,
    parallel: bool,
}

impl<'c> OperationMatcher<'c> {
    pub fn new(config: &'c MatcherConfig, mapper: &'c BodyMapper, parallel: bool) -> Self {
        Self {
            config,
            mapper,
            parallel,
        }
    }

    fn collect<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    /// Body mapping for one pair; `None` for bodiless operations or once
    /// the token has fired
    fn run_mapping(
        &self,
        before: &Model,
        b: OperationRef,
        after: &Model,
        a: OperationRef,
        cancel: &CancellationToken,
    ) -> Option<BodyMapping> {
        if cancel.is_cancelled() {
            return None;
        }
        let bo = before.operation(b);
        let ao = after.operation(a);
        if bo.body.is_none() || ao.body.is_none() {
            return None;
        }
        Some(self.mapper.map_operations(b, bo, a, ao))
    }

    pub fn match_type_pair(
        &self,
        before: &Model,
        after: &Model,
        bt: TypeRef,
        at: TypeRef,
        cancel: &CancellationToken,
    ) -> PairOutcome {
        let mut after_by_key: BTreeMap<String, Vec<OperationRef>> = BTreeMap::new();
        for a in after.operation_refs(at) {
            after_by_key
                .entry(after.operation(a).signature_key())
                .or_default()
                .push(a);
        }

        let mut signature_pairs = Vec::new();
        let mut before_left = Vec::new();
        for b in before.operation_refs(bt) {
            let key = before.operation(b).signature_key();
            match after_by_key.get_mut(&key).filter(|list| !list.is_empty()) {
                Some(list) => signature_pairs.push((b, list.remove(0))),
                None => before_left.push(b),
            }
        }
        let taken: FxHashSet<OperationRef> = signature_pairs.iter().map(|&(_, a)| a).collect();
        let after_left: Vec<OperationRef> = after.operation_refs(at).filter(|a| !taken.contains(a)).collect();

        let mut matches: Vec<LocalMatch> = self.collect(&signature_pairs, |&(b, a)| LocalMatch {
            before: b,
            after: a,
            kind: OperationMatchKind::Signature,
            score: 1.0,
            mapping: self.run_mapping(before, b, after, a, cancel),
        });

        let no_skip = |_: OperationRef, _: OperationRef| false;
        let policy = LeftoverPolicy {
            kind: OperationMatchKind::Body,
            min_coverage: 0.0,
            pair_bodiless: true,
            skip: &no_skip,
        };
        let leftover = self.match_leftovers(before, after, &before_left, &after_left, cancel, &policy);

        let matched_before: FxHashSet<OperationRef> = leftover.iter().map(|m| m.before).collect();
        let matched_after: FxHashSet<OperationRef> = leftover.iter().map(|m| m.after).collect();
        matches.extend(leftover);
        matches.sort_by_key(|m| m.before);

        debug!(
            before = %before.type_decl(bt).name,
            after = %after.type_decl(at).name,
            matched = matches.len(),
            "Operations matched for type pair"
        );

        PairOutcome {
            matches,
            removed: before_left.into_iter().filter(|b| !matched_before.contains(b)).collect(),
            added: after_left.into_iter().filter(|a| !matched_after.contains(a)).collect(),
            cancelled: cancel.is_cancelled(),
        }
    }

    /// Two-phase matching of operations left over on both sides
    pub fn match_leftovers(
        &self,
        before: &Model,
        after: &Model,
        befores: &[OperationRef],
        afters: &[OperationRef],
        cancel: &CancellationToken,
        policy: &LeftoverPolicy<'_>,
    ) -> Vec<LocalMatch> {
        let mut name_pairs = Vec::new();
        let mut body_pairs = Vec::new();
        for (bi, &b) in befores.iter().enumerate() {
            let bo = before.operation(b);
            let bn = bo.statement_count();
            for (ai, &a) in afters.iter().enumerate() {
                if (policy.skip)(b, a) {
                    continue;
                }
                let ao = after.operation(a);
                let an = ao.statement_count();
                if bn == 0 || an == 0 {
                    if policy.pair_bodiless && bn == 0 && an == 0 && bo.name == ao.name {
                        name_pairs.push((b, a));
                    }
                    continue;
                }
                if buckets_compatible(bn, an, self.config.bucket_tolerance) {
                    body_pairs.push((bi, ai));
                }
            }
        }

        let mut taken_before = FxHashSet::default();
        let mut taken_after = FxHashSet::default();
        let mut out = Vec::new();

        for (b, a) in name_pairs {
            if taken_before.contains(&b) || taken_after.contains(&a) {
                continue;
            }
            taken_before.insert(b);
            taken_after.insert(a);
            let param = parameter_similarity(before.operation(b), after.operation(a));
            out.push(LocalMatch {
                before: b,
                after: a,
                kind: OperationMatchKind::Name,
                score: self.config.pair_score(None, 1.0, param),
                mapping: self.run_mapping(before, b, after, a, cancel),
            });
        }

        let scored = if body_pairs.len() > self.config.max_candidate_pairs {
            debug!(
                pairs = body_pairs.len(),
                limit = self.config.max_candidate_pairs,
                "Too many candidate pairs, falling back to name similarity"
            );
            self.score_by_name(before, after, befores, afters, &body_pairs)
        } else {
            self.score_by_body(before, after, befores, afters, &body_pairs, cancel, policy.min_coverage)
        };

        let fallback = body_pairs.len() > self.config.max_candidate_pairs;
        for s in scored {
            if taken_before.contains(&s.before) || taken_after.contains(&s.after) {
                continue;
            }
            let mapping = match s.mapping {
                Some(m) => Some(m),
                None => self.run_mapping(before, s.before, after, s.after, cancel),
            };
            if fallback {
                let coverage = mapping.as_ref().map(|m| m.coverage()).unwrap_or(0.0);
                if coverage < policy.min_coverage {
                    continue;
                }
            }
            taken_before.insert(s.before);
            taken_after.insert(s.after);
            out.push(LocalMatch {
                before: s.before,
                after: s.after,
                kind: if fallback {
                    OperationMatchKind::Name
                } else {
                    policy.kind
                },
                score: s.score,
                mapping,
            });
        }
        out
    }

    /// Speculative mapping of every surviving pair, ranked by coverage,
    /// then signature distance, then declaration order
    fn score_by_body(
        &self,
        before: &Model,
        after: &Model,
        befores: &[OperationRef],
        afters: &[OperationRef],
        pairs: &[(usize, usize)],
        cancel: &CancellationToken,
        min_coverage: f64,
    ) -> Vec<Scored> {
        let evaluated: Vec<Option<Scored>> = self.collect(pairs, |&(bi, ai)| {
            let (b, a) = (befores[bi], afters[ai]);
            let mapping = self.run_mapping(before, b, after, a, cancel)?;
            if !mapping.mapped_exceeds_unmapped() || mapping.coverage() < min_coverage {
                return None;
            }
            let bo = before.operation(b);
            let ao = after.operation(a);
            let coverage = mapping.coverage();
            Some(Scored {
                before: b,
                after: a,
                order: (bi, ai),
                coverage,
                signature_distance: signature_distance(bo, ao),
                score: self.config.pair_score(
                    Some(coverage),
                    name_similarity(&bo.name, &ao.name),
                    parameter_similarity(bo, ao),
                ),
                mapping: Some(mapping),
            })
        });
        let mut scored: Vec<Scored> = evaluated.into_iter().flatten().collect();
        scored.sort_by(|x, y| {
            y.coverage
                .total_cmp(&x.coverage)
                .then(x.signature_distance.cmp(&y.signature_distance))
                .then(x.order.cmp(&y.order))
        });
        scored
    }

    /// Name/parameter score only; no body mapping before acceptance
    fn score_by_name(
        &self,
        before: &Model,
        after: &Model,
        befores: &[OperationRef],
        afters: &[OperationRef],
        pairs: &[(usize, usize)],
    ) -> Vec<Scored> {
        let mut scored: Vec<Scored> = pairs
            .iter()
            .filter_map(|&(bi, ai)| {
                let (b, a) = (befores[bi], afters[ai]);
                let bo = before.operation(b);
                let ao = after.operation(a);
                let name = name_similarity(&bo.name, &ao.name);
                if name < self.config.name_similarity_floor {
                    return None;
                }
                Some(Scored {
                    before: b,
                    after: a,
                    order: (bi, ai),
                    coverage: 0.0,
                    signature_distance: signature_distance(bo, ao),
                    score: self.config.pair_score(None, name, parameter_similarity(bo, ao)),
                    mapping: None,
                })
            })
            .collect();
        scored.sort_by(|x, y| {
            y.score
                .total_cmp(&x.score)
                .then(x.signature_distance.cmp(&y.signature_distance))
                .then(x.order.cmp(&y.order))
        });
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapperConfig;
    use crate::shared::models::builders::{call, declare, expr_stmt, lit, ret, var, OperationBuilder, TypeBuilder};
    use crate::shared::models::{Operation, Statement};

    fn work_body(tag: &str) -> Vec<Statement> {
        vec![
            declare("int", "total", lit("0")),
            expr_stmt(call("load", vec![var("total")])),
            expr_stmt(call("check", vec![var("total")])),
            expr_stmt(call(tag, vec![])),
            ret(var("total")),
        ]
    }

    fn model(ops: Vec<Operation>) -> Model {
        let t = ops.into_iter().fold(TypeBuilder::new("a.Worker"), |t, op| t.operation(op));
        Model::new(vec![t.build()])
    }

    fn run(before: &Model, after: &Model, config: &MatcherConfig) -> PairOutcome {
        let mapper = BodyMapper::new(MapperConfig::default());
        let matcher = OperationMatcher::new(config, &mapper, false);
        matcher.match_type_pair(before, after, TypeRef(0), TypeRef(0), &CancellationToken::new())
    }

    #[test]
    fn test_signature_then_body_rename() {
        let before = model(vec![
            OperationBuilder::new("keep").body(work_body("a")).build(),
            OperationBuilder::new("process").body(work_body("b")).build(),
        ]);
        let after = model(vec![
            OperationBuilder::new("keep").body(work_body("a")).build(),
            OperationBuilder::new("unrelated").body(vec![ret(lit("1"))]).build(),
            OperationBuilder::new("handle").body(work_body("b")).build(),
        ]);
        let outcome = run(&before, &after, &MatcherConfig::default());
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].kind, OperationMatchKind::Signature);
        let renamed = &outcome.matches[1];
        assert_eq!(renamed.kind, OperationMatchKind::Body);
        assert_eq!(after.operation(renamed.after).name, "handle");
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.added.len(), 1);
    }

    #[test]
    fn test_coverage_tie_broken_by_signature_distance() {
        let before = model(vec![OperationBuilder::new("compute").body(work_body("x")).build()]);
        let after = model(vec![
            OperationBuilder::new("zzz").body(work_body("x")).build(),
            OperationBuilder::new("computeAll").body(work_body("x")).build(),
        ]);
        let outcome = run(&before, &after, &MatcherConfig::default());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(after.operation(outcome.matches[0].after).name, "computeAll");
    }

    #[test]
    fn test_bodiless_operations_pair_by_name() {
        let before = model(vec![OperationBuilder::new("visit").param("Node", "n").without_body().build()]);
        let after = model(vec![OperationBuilder::new("visit")
            .param("Node", "n")
            .param("Context", "c")
            .without_body()
            .build()]);
        let outcome = run(&before, &after, &MatcherConfig::default());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].kind, OperationMatchKind::Name);
        assert!(outcome.matches[0].mapping.is_none());
    }

    #[test]
    fn test_name_fallback_over_candidate_limit() {
        let before = model(vec![OperationBuilder::new("process").body(work_body("b")).build()]);
        let after = model(vec![
            OperationBuilder::new("processAll").body(work_body("b")).build(),
            OperationBuilder::new("other").body(work_body("b")).build(),
        ]);
        let config = MatcherConfig::default().max_candidate_pairs(1);
        let outcome = run(&before, &after, &config);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].kind, OperationMatchKind::Name);
        assert_eq!(after.operation(outcome.matches[0].after).name, "processAll");
    }

    #[test]
    fn test_cancelled_token_skips_mappings() {
        let before = model(vec![OperationBuilder::new("keep").body(work_body("a")).build()]);
        let after = before.clone();
        let mapper = BodyMapper::new(MapperConfig::default());
        let config = MatcherConfig::default();
        let matcher = OperationMatcher::new(&config, &mapper, false);
        let token = CancellationToken::new();
        token.cancel();
        let outcome = matcher.match_type_pair(&before, &after, TypeRef(0), TypeRef(0), &token);
        assert!(outcome.cancelled);
        assert_eq!(outcome.matches.len(), 1);
        assert!(outcome.matches[0].mapping.is_none());
    }
}
