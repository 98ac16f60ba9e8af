//! Class-level refactorings

use super::support::annotation_changes;
use crate::features::model_diff::TypeMatchKind;
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::{DeclarationPair, Refactoring};

pub fn classify(ctx: &DetectionContext<'_>) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for tm in &ctx.diff.type_matches {
        let (before, after) = (tm.before, tm.after);
        match tm.kind {
            TypeMatchKind::Same => {}
            TypeMatchKind::Moved => out.push(Refactoring::MoveClass { before, after }),
            TypeMatchKind::Renamed => out.push(Refactoring::RenameClass { before, after }),
            TypeMatchKind::MovedAndRenamed => {
                out.push(Refactoring::MoveAndRenameClass { before, after })
            }
        }

        let b = ctx.before.type_decl(before);
        let a = ctx.after.type_decl(after);
        let on = DeclarationPair::Type { before, after };
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, MapperConfig, MatcherConfig};
    use crate::features::body_mapper::BodyMapper;
    use crate::features::model_diff::{ModelDiffer, RenameHints};
    use crate::shared::models::builders::{call, expr_stmt, var, OperationBuilder, TypeBuilder};
    use crate::shared::models::{Model, Visibility};
    use crate::shared::CancellationToken;

    #[test]
    fn test_moved_class_with_new_annotation() {
        let op = OperationBuilder::new("run")
            .body(vec![expr_stmt(call("work", vec![var("a")]))])
            .build();
        let before = Model::new(vec![TypeBuilder::new("a.Job").operation(op.clone()).build()]);
        let after = Model::new(vec![TypeBuilder::new("b.Job")
            .annotate("Component")
            .visibility(Visibility::Package)
            .operation(op)
            .build()]);

        let differ = ModelDiffer::new(MatcherConfig::default(), MapperConfig::default(), false);
        let diff = differ.diff(&before, &after, &RenameHints::new(), &CancellationToken::new());
        let mapper = BodyMapper::new(MapperConfig::default());
        let config = ClassifierConfig::default();
        let ctx = DetectionContext::new(&before, &after, &diff, &config, &mapper);

        let found = classify(&ctx);
        assert_eq!(found.len(), 3);
        assert!(matches!(found[0], Refactoring::MoveClass { .. }));
        assert!(matches!(&found[1], Refactoring::AddAnnotation { annotation, .. } if annotation.name == "Component"));
        assert!(matches!(
            found[2],
            Refactoring::ChangeAccessModifier {
                from: Visibility::Public,
                to: Visibility::Package,
                ..
            }
        ));
    }
}
