//! Attribute refactorings

use super::support::annotation_changes;
use crate::features::model_diff::AttributeMatchKind;
use crate::features::refactoring::application::context::{DetectionContext, OwnerRelation};
use crate::features::refactoring::domain::{DeclarationPair, Refactoring};

pub fn classify(ctx: &DetectionContext<'_>) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for am in &ctx.diff.attribute_matches {
        let (before, after) = (am.before, am.after);
        match am.kind {
            AttributeMatchKind::Name => {}
            AttributeMatchKind::Renamed => out.push(Refactoring::RenameAttribute { before, after }),
            AttributeMatchKind::CrossType => match ctx.relation(before.owner, after.owner) {
                OwnerRelation::Superclass => out.push(Refactoring::PullUpAttribute { before, after }),
                OwnerRelation::Subclass => out.push(Refactoring::PushDownAttribute { before, after }),
                OwnerRelation::Same | OwnerRelation::Unrelated => {
                    out.push(Refactoring::MoveAttribute { before, after })
                }
            },
            AttributeMatchKind::MovedAndRenamed => out.push(Refactoring::MoveAndRenameAttribute { before, after }),
        }

        let b = ctx.before.attribute(before);
        let a = ctx.after.attribute(after);
        if b.type_name != a.type_name {
            out.push(Refactoring::ChangeAttributeType {
                before,
                after,
                from: b.type_name.clone(),
                to: a.type_name.clone(),
            });
        }
        let on = DeclarationPair::Attribute { before, after };
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
