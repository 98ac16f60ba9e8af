//! Operation rename/move and signature changes over matched pairs

use super::support::annotation_changes;
use crate::features::body_mapper::MapperArena;
use crate::features::refactoring::application::context::{DetectionContext, OwnerRelation};
use crate::features::refactoring::domain::{DeclarationPair, Refactoring};
use crate::shared::models::{OperationRef, Parameter};

pub fn classify(ctx: &DetectionContext<'_>, arena: &MapperArena) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for m in &ctx.diff.operation_matches {
        let b = ctx.before.operation(m.before);
        let a = ctx.after.operation(m.after);
        let (before, after, mapper) = (m.before, m.after, m.mapper);

        let supported = match mapper.and_then(|id| arena.get(id)) {
            Some(mapping) if mapping.before_scope > 0 || mapping.after_scope > 0 => {
                mapping.coverage() >= ctx.config.rename_move_coverage
                    || mapping.mapped_exceeds_unmapped()
            }
            _ => true,
        };
        let renamed = b.name != a.name && !b.is_constructor && !a.is_constructor;

        if supported {
            match ctx.relation(before.owner, after.owner) {
                OwnerRelation::Same if renamed => out.push(Refactoring::RenameOperation {
                    before,
                    after,
                    mapper,
                }),
                OwnerRelation::Same => {}
                OwnerRelation::Superclass => out.push(Refactoring::PullUpOperation {
                    before,
                    after,
                    mapper,
                }),
                OwnerRelation::Subclass => out.push(Refactoring::PushDownOperation {
                    before,
                    after,
                    mapper,
                }),
                OwnerRelation::Unrelated if renamed => {
                    out.push(Refactoring::MoveAndRenameOperation {
                        before,
                        after,
                        mapper,
                    })
                }
                OwnerRelation::Unrelated => out.push(Refactoring::MoveOperation {
                    before,
                    after,
                    mapper,
                }),
            }
        }

        if !b.is_constructor && !a.is_constructor && b.return_type != a.return_type {
            out.push(Refactoring::ChangeReturnType {
                before,
                after,
                from: b.return_type.clone().unwrap_or_else(|| "void".to_string()),
                to: a.return_type.clone().unwrap_or_else(|| "void".to_string()),
            });
        }

        out.extend(parameter_changes(before, after, &b.parameters, &a.parameters));

        for exception in &b.thrown_types {
            if !a.thrown_types.contains(exception) {
                out.push(Refactoring::RemoveThrownExceptionType {
                    before,
                    after,
                    exception: exception.clone(),
                });
            }
        }
        for exception in &a.thrown_types {
            if !b.thrown_types.contains(exception) {
                out.push(Refactoring::AddThrownExceptionType {
                    before,
                    after,
                    exception: exception.clone(),
                });
            }
        }

        let on = DeclarationPair::Operation { before, after };
        out.extend(annotation_changes(on, &b.annotations, &a.annotations));
        if b.visibility != a.visibility {
            out.push(Refactoring::ChangeAccessModifier {
                on,
                from: b.visibility,
                to: a.visibility,
            });
        }
    }
    out
}

/// Parameter list differences
///
/// Same multiset in another order is a reorder. Otherwise parameters pair by
/// name (type change), then leftovers pair in order by type (rename); the
/// rest are added or removed.
fn parameter_changes(
    before: OperationRef,
    after: OperationRef,
    b: &[Parameter],
    a: &[Parameter],
) -> Vec<Refactoring> {
    let key = |p: &Parameter| (p.name.clone(), p.display_type());
    if b.len() == a.len() && b.iter().map(key).ne(a.iter().map(key)) {
        let mut bs: Vec<_> = b.iter().map(key).collect();
        let mut as_: Vec<_> = a.iter().map(key).collect();
        bs.sort();
        as_.sort();
        if bs == as_ {
            return vec![Refactoring::ReorderParameter { before, after }];
        }
    }

    let mut out = Vec::new();
    let mut used_a = vec![false; a.len()];
    let mut left_b = Vec::new();
    let mut name_pairs = Vec::new();
    for (i, p) in b.iter().enumerate() {
        match (0..a.len()).find(|&j| !used_a[j] && a[j].name == p.name) {
            Some(j) => {
                used_a[j] = true;
                name_pairs.push((i, j));
                if p.display_type() != a[j].display_type() {
                    out.push(Refactoring::ChangeParameterType {
                        before,
                        after,
                        from: p.clone(),
                        to: a[j].clone(),
                    });
                }
            }
            None => left_b.push(i),
        }
    }
    let mut removed = Vec::new();
    for i in left_b {
        let same_type = (0..a.len()).find(|&j| !used_a[j] && a[j].display_type() == b[i].display_type());
        match same_type {
            Some(j) => {
                used_a[j] = true;
                out.push(Refactoring::RenameParameter {
                    before,
                    after,
                    from: b[i].clone(),
                    to: a[j].clone(),
                });
            }
            None => removed.push(i),
        }
    }
    let added: Vec<usize> = (0..a.len()).filter(|&j| !used_a[j]).collect();

    for i in removed {
        out.push(Refactoring::RemoveParameter {
            before,
            after,
            parameter: b[i].clone(),
        });
    }
    for j in added {
        out.push(Refactoring::AddParameter {
            before,
            after,
            parameter: a[j].clone(),
        });
    }

    // surviving parameters that swapped places
    let order_changed = name_pairs.windows(2).any(|w| w[0].1 > w[1].1);
    if order_changed {
        out.push(Refactoring::ReorderParameter { before, after });
    }
    out
}
