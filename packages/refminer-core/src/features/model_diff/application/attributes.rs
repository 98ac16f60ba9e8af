//! Attribute matching

use crate::features::body_mapper::BodyMapping;
use crate::features::model_diff::domain::{AttributeMatch, AttributeMatchKind};
use crate::features::replacement::ReplacementKind;
use crate::shared::models::{AttributeRef, Model, TypeRef};
use std::collections::{BTreeMap, BTreeSet};

pub(super) struct AttributeOutcome {
    pub matches: Vec<AttributeMatch>,
    pub removed: Vec<AttributeRef>,
    pub added: Vec<AttributeRef>,
}

/// Same-name attributes, then renames backed by `VariableRenamed`
/// replacements in the pair's body mappings, then unique same-type pairs
/// with an identical initializer
pub(super) fn match_type_pair(
    before: &Model,
    after: &Model,
    bt: TypeRef,
    at: TypeRef,
    evidence: &[&BodyMapping],
) -> AttributeOutcome {
    let mut matches = Vec::new();
    let mut before_left = Vec::new();
    let mut after_left: Vec<AttributeRef> = after.attribute_refs(at).collect();

    for b in before.attribute_refs(bt) {
        let name = &before.attribute(b).name;
        match after_left.iter().position(|&a| &after.attribute(a).name == name) {
            Some(pos) => {
                let a = after_left.remove(pos);
                matches.push(AttributeMatch {
                    before: b,
                    after: a,
                    kind: AttributeMatchKind::Name,
                });
            }
            None => before_left.push(b),
        }
    }

    // (before name, after name) → occurrences
    let mut renames: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for mapping in evidence {
        for r in mapping.replacements() {
            if r.kind == ReplacementKind::VariableRenamed {
                *renames.entry((r.before.as_str(), r.after.as_str())).or_default() += 1;
            }
        }
    }
    let mut candidates: Vec<(usize, AttributeRef, AttributeRef)> = Vec::new();
    for &b in &before_left {
        for &a in &after_left {
            let key = (before.attribute(b).name.as_str(), after.attribute(a).name.as_str());
            if let Some(&count) = renames.get(&key) {
                candidates.push((count, b, a));
            }
        }
    }
    candidates.sort_by(|x, y| y.0.cmp(&x.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));
    for (_, b, a) in candidates {
        let (Some(bp), Some(ap)) = (
            before_left.iter().position(|&x| x == b),
            after_left.iter().position(|&x| x == a),
        ) else {
            continue;
        };
        before_left.remove(bp);
        after_left.remove(ap);
        matches.push(AttributeMatch {
            before: b,
            after: a,
            kind: AttributeMatchKind::Renamed,
        });
    }

    if before_left.len() == 1 && after_left.len() == 1 {
        let (b, a) = (before_left[0], after_left[0]);
        let (ba, aa) = (before.attribute(b), after.attribute(a));
        let same_init = match (&ba.initializer, &aa.initializer) {
            (Some(x), Some(y)) => x.text == y.text,
            _ => false,
        };
        if ba.type_name == aa.type_name && same_init {
            before_left.clear();
            after_left.clear();
            matches.push(AttributeMatch {
                before: b,
                after: a,
                kind: AttributeMatchKind::Renamed,
            });
        }
    }

    AttributeOutcome {
        matches,
        removed: before_left,
        added: after_left,
    }
}

/// Leftover attributes with the same name and type in different types,
/// when the pairing is unique
pub(super) fn match_cross_type(
    before: &Model,
    after: &Model,
    removed: &[AttributeRef],
    added: &[AttributeRef],
    same_owner: impl Fn(TypeRef, TypeRef) -> bool,
) -> Vec<AttributeMatch> {
    let mut by_key: BTreeMap<(&str, &str), (Vec<AttributeRef>, Vec<AttributeRef>)> = BTreeMap::new();
    for &b in removed {
        let attr = before.attribute(b);
        by_key
            .entry((attr.name.as_str(), attr.type_name.as_str()))
            .or_default()
            .0
            .push(b);
    }
    for &a in added {
        let attr = after.attribute(a);
        if let Some(entry) = by_key.get_mut(&(attr.name.as_str(), attr.type_name.as_str())) {
            entry.1.push(a);
        }
    }
    by_key
        .into_values()
        .filter_map(|(bs, as_)| match (bs.as_slice(), as_.as_slice()) {
            ([b], [a]) if !same_owner(b.owner, a.owner) => Some(AttributeMatch {
                before: *b,
                after: *a,
                kind: AttributeMatchKind::CrossType,
            }),
            _ => None,
        })
        .collect()
}

/// Leftover pairs across owners with the same type but a new name
///
/// A pair needs an identical initializer or a `VariableRenamed` replacement
/// for the two names somewhere in `evidence`, and neither side may have
/// another such candidate.
pub(super) fn match_cross_type_renamed(
    before: &Model,
    after: &Model,
    removed: &[AttributeRef],
    added: &[AttributeRef],
    same_owner: impl Fn(TypeRef, TypeRef) -> bool,
    evidence: &[&BodyMapping],
) -> Vec<AttributeMatch> {
    let renames: BTreeSet<(&str, &str)> = evidence
        .iter()
        .flat_map(|m| m.replacements())
        .filter(|r| r.kind == ReplacementKind::VariableRenamed)
        .map(|r| (r.before.as_str(), r.after.as_str()))
        .collect();

    let mut candidates: Vec<(AttributeRef, AttributeRef)> = Vec::new();
    for &b in removed {
        let ba = before.attribute(b);
        for &a in added {
            let aa = after.attribute(a);
            if ba.name == aa.name || ba.type_name != aa.type_name || same_owner(b.owner, a.owner) {
                continue;
            }
            let same_init = match (&ba.initializer, &aa.initializer) {
                (Some(x), Some(y)) => x.text == y.text,
                _ => false,
            };
            if same_init || renames.contains(&(ba.name.as_str(), aa.name.as_str())) {
                candidates.push((b, a));
            }
        }
    }

    let mut per_before: BTreeMap<AttributeRef, usize> = BTreeMap::new();
    let mut per_after: BTreeMap<AttributeRef, usize> = BTreeMap::new();
    for &(b, a) in &candidates {
        *per_before.entry(b).or_default() += 1;
        *per_after.entry(a).or_default() += 1;
    }
    candidates
        .into_iter()
        .filter(|(b, a)| per_before.get(b) == Some(&1) && per_after.get(a) == Some(&1))
        .map(|(before, after)| AttributeMatch {
            before,
            after,
            kind: AttributeMatchKind::MovedAndRenamed,
        })
        .collect()
}
