//! Extract Superclass and Extract Interface
//!
//! An added type qualifies when matched types start extending (or
//! implementing) it and at least one of their members either moved into it
//! or is now declared there by signature.

use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::features::model_diff::TypeMatch;
use crate::shared::models::{TypeDeclaration, TypeKind, TypeRef};

fn is_supertype(sub: &TypeDeclaration, sup: &TypeDeclaration) -> bool {
    match sup.kind {
        TypeKind::Interface => sub.implements(&sup.name),
        _ => sub.extends(&sup.name),
    }
}

/// Members of `tm` that now live in `extracted`, moved or re-declared
fn shares_members(ctx: &DetectionContext<'_>, tm: &TypeMatch, extracted: TypeRef) -> bool {
    let moved_operation = ctx
        .diff
        .operation_matches
        .iter()
        .any(|m| m.before.owner == tm.before && m.after.owner == extracted);
    let moved_attribute = ctx
        .diff
        .attribute_matches
        .iter()
        .any(|m| m.before.owner == tm.before && m.after.owner == extracted);
    if moved_operation || moved_attribute {
        return true;
    }
    let declared = &ctx.after.type_decl(extracted).operations;
    ctx.after
        .type_decl(tm.after)
        .operations
        .iter()
        .any(|op| declared.iter().any(|d| d.signature_key() == op.signature_key()))
}

pub fn classify(ctx: &DetectionContext<'_>) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for &extracted in &ctx.diff.added_types {
        let sup = ctx.after.type_decl(extracted);
        let from: Vec<TypeRef> = ctx
            .diff
            .type_matches
            .iter()
            .filter(|tm| {
                is_supertype(ctx.after.type_decl(tm.after), sup)
                    && !is_supertype(ctx.before.type_decl(tm.before), sup)
                    && shares_members(ctx, tm, extracted)
            })
            .map(|tm| tm.before)
            .collect();
        if from.is_empty() {
            continue;
        }
        out.push(match sup.kind {
            TypeKind::Interface => Refactoring::ExtractInterface { extracted, from },
            _ => Refactoring::ExtractSuperclass { extracted, from },
        });
    }
    out
}
