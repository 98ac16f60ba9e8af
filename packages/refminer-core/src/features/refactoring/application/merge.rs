//! Priority merge of classifier candidates
//!
//! Candidates are ranked by kind priority (stable, so classifier order breaks
//! ties). Walking that order, each edge-citing candidate claims the fragments
//! its mappings cover. A fragment already claimed by a different claim group
//! drops the later candidate; the same group may claim it again, which is how
//! one extracted body can explain several duplicated call sites.

use crate::errors::{MinerError, Result};
use crate::features::body_mapper::{MapperArena, StatementId};
use crate::features::refactoring::domain::{ClaimGroup, Refactoring};
use crate::shared::models::OperationRef;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Before,
    After,
}

type ClaimKey = (Side, OperationRef, StatementId);

/// Dedupe, rank and resolve claims. Fails only when a cited mapping is
/// missing or not one-to-one.
pub fn merge_candidates(candidates: Vec<Refactoring>, arena: &MapperArena) -> Result<Vec<Refactoring>> {
    let mut seen: FxHashSet<Refactoring> = FxHashSet::default();
    let mut ranked: Vec<Refactoring> = candidates.into_iter().filter(|r| seen.insert(r.clone())).collect();
    ranked.sort_by_key(|r| r.kind().priority());

    let mut ledger: FxHashMap<ClaimKey, ClaimGroup> = FxHashMap::default();
    let mut accepted = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        let mut keys: Vec<ClaimKey> = Vec::new();
        for id in candidate.cited_mappers() {
            let mapping = arena
                .get(id)
                .ok_or_else(|| MinerError::invariant(format!("{} cites unknown mapper {:?}", candidate.kind(), id)))?;
            if !mapping.is_bijective() {
                return Err(MinerError::invariant(format!(
                    "{} cites mapper {:?} whose edges are not one-to-one",
                    candidate.kind(),
                    id
                )));
            }
            for edge in &mapping.edges {
                keys.push((Side::Before, mapping.before, edge.before.statement));
                keys.push((Side::After, mapping.after, edge.after.statement));
            }
        }

        let Some(group) = candidate.claim_group() else {
            accepted.push(candidate);
            continue;
        };
        let contested = keys
            .iter()
            .any(|k| ledger.get(k).is_some_and(|owner| *owner != group));
        if contested {
            debug!(kind = %candidate.kind(), "Candidate dropped, its fragments are already explained");
            continue;
        }
        for key in keys {
            ledger.insert(key, group);
        }
        accepted.push(candidate);
    }
    Ok(accepted)
}
