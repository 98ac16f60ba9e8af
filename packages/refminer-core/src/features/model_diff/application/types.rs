//! Type-level matching

use crate::config::MatcherConfig;
use crate::features::model_diff::domain::{RenameHints, TypeMatch, TypeMatchKind};
use crate::features::model_diff::infrastructure::prefilter::member_similarity;
use crate::shared::models::{Model, TypeRef};
use tracing::debug;

pub(super) struct TypeMatching {
    pub matches: Vec<TypeMatch>,
    pub removed: Vec<TypeRef>,
    pub added: Vec<TypeRef>,
}

/// Same-FQN pairs first, then moved/renamed pairs by member overlap
pub(super) fn match_types(
    before: &Model,
    after: &Model,
    config: &MatcherConfig,
    hints: &RenameHints,
) -> TypeMatching {
    let mut matches = Vec::new();
    let mut before_free = Vec::new();
    let mut after_taken = vec![false; after.len()];

    for b in before.type_refs() {
        match after.find(&before.type_decl(b).name) {
            Some(a) => {
                after_taken[a.index()] = true;
                matches.push(TypeMatch {
                    before: b,
                    after: a,
                    kind: TypeMatchKind::Same,
                    similarity: 1.0,
                });
            }
            None => before_free.push(b),
        }
    }
    let after_free: Vec<TypeRef> = after.type_refs().filter(|a| !after_taken[a.index()]).collect();

    let mut candidates: Vec<TypeMatch> = Vec::new();
    for &b in &before_free {
        let bd = before.type_decl(b);
        for &a in &after_free {
            let ad = after.type_decl(a);
            let same_simple = bd.simple_name() == ad.simple_name();
            let same_package = bd.package() == ad.package();
            let (kind, mut threshold) = match (same_package, same_simple) {
                (false, true) => (TypeMatchKind::Moved, config.move_type_threshold),
                (true, false) => (TypeMatchKind::Renamed, config.rename_type_threshold),
                (false, false) => (TypeMatchKind::MovedAndRenamed, config.move_rename_type_threshold),
                // Same package and simple name means same FQN, handled above
                (true, true) => continue,
            };
            if hints.get(&bd.file_path) == Some(&ad.file_path) {
                threshold = threshold.min(config.rename_hint_threshold);
            }
            let similarity = member_similarity(bd, ad);
            if similarity > 0.0 && similarity >= threshold {
                candidates.push(TypeMatch {
                    before: b,
                    after: a,
                    kind,
                    similarity,
                });
            }
        }
    }

    candidates.sort_by(|x, y| {
        y.similarity
            .total_cmp(&x.similarity)
            .then(x.kind.cmp(&y.kind))
            .then(x.before.cmp(&y.before))
            .then(x.after.cmp(&y.after))
    });

    let mut before_taken = vec![false; before.len()];
    for c in candidates {
        if before_taken[c.before.index()] || after_taken[c.after.index()] {
            continue;
        }
        debug!(
            before = %before.type_decl(c.before).name,
            after = %after.type_decl(c.after).name,
            kind = ?c.kind,
            similarity = c.similarity,
            "Type pair matched by member overlap"
        );
        before_taken[c.before.index()] = true;
        after_taken[c.after.index()] = true;
        matches.push(c);
    }

    let removed = before_free
        .into_iter()
        .filter(|b| !before_taken[b.index()])
        .collect();
    let added = after_free
        .into_iter()
        .filter(|a| !after_taken[a.index()])
        .collect();

    TypeMatching {
        matches,
        removed,
        added,
    }
}
