//! Local variable renames and type changes over mapped declarations

use crate::features::body_mapper::MapperArena;
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::shared::models::Operation;
use std::collections::BTreeSet;

pub fn classify(ctx: &DetectionContext<'_>, arena: &MapperArena) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for (m, id) in ctx.mapped_matches() {
        let Some(mapping) = arena.get(id) else {
            continue;
        };
        let before_walk = walk(ctx.before.operation(m.before));
        let after_walk = walk(ctx.after.operation(m.after));

        // (from, to) and (name, from type, to type), deduplicated per pair
        let mut renames = BTreeSet::new();
        let mut retypes = BTreeSet::new();
        for edge in &mapping.edges {
            if edge.before.expression.is_some() || edge.after.expression.is_some() {
                continue;
            }
            let (Some(b), Some(a)) = (
                before_walk.get(edge.before.statement as usize),
                after_walk.get(edge.after.statement as usize),
            ) else {
                continue;
            };
            if b.variables.len() != a.variables.len() {
                continue;
            }
            for (bv, av) in b.variables.iter().zip(&a.variables) {
                if bv.name != av.name {
                    renames.insert((bv.name.clone(), av.name.clone()));
                }
                if bv.type_name != av.type_name {
                    retypes.insert((av.name.clone(), bv.type_name.clone(), av.type_name.clone()));
                }
            }
        }

        // parameter renames are reported on the signature
        let b_params = ctx.before.operation(m.before).parameter_names();
        for (from, to) in renames {
            if b_params.contains(&from.as_str()) {
                continue;
            }
            out.push(Refactoring::RenameVariable {
                before: m.before,
                after: m.after,
                from,
                to,
            });
        }
        for (name, from, to) in retypes {
            out.push(Refactoring::ChangeVariableType {
                before: m.before,
                after: m.after,
                name,
                from,
                to,
            });
        }
    }
    out
}

fn walk(op: &Operation) -> Vec<&crate::shared::models::Statement> {
    op.body
        .as_ref()
        .map(|body| body.walk().into_iter().map(|e| e.statement).collect())
        .unwrap_or_default()
}
