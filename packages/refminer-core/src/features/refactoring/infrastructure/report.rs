//! Refactoring → report rendering
//!
//! Resolves the references a `Refactoring` carries against both snapshots:
//! qualified names, signatures, declaration ranges and a one-line
//! description in the familiar "Rename Method a() renamed to b() in class X"
//! form.

use crate::features::refactoring::domain::{CodeElement, DeclarationPair, Refactoring, RefactoringReport};
use crate::shared::models::{AttributeRef, CodeRange, Model, OperationRef, Parameter, TypeRef};

/// Resolved view of one declaration
struct Resolved {
    element: CodeElement,
    range: CodeRange,
    /// Short form used inside descriptions
    label: String,
    /// Qualified owner type name
    owner: String,
}

fn type_view(model: &Model, r: TypeRef) -> Resolved {
    let decl = model.type_decl(r);
    let kind = format!("{:?}", decl.kind).to_lowercase();
    Resolved {
        element: CodeElement::new(decl.name.clone(), format!("{} {}", kind, decl.simple_name())),
        range: decl.code_range(),
        label: decl.name.clone(),
        owner: decl.name.clone(),
    }
}

fn operation_view(model: &Model, r: OperationRef) -> Resolved {
    let owner = model.type_decl(r.owner).name.clone();
    let op = model.operation(r);
    let signature = op.signature();
    Resolved {
        element: CodeElement::new(format!("{}.{}", owner, op.name), signature.clone()),
        range: model.operation_range(r),
        label: signature,
        owner,
    }
}

fn attribute_view(model: &Model, r: AttributeRef) -> Resolved {
    let owner = model.type_decl(r.owner).name.clone();
    let attr = model.attribute(r);
    let signature = format!("{} : {}", attr.name, attr.type_name);
    Resolved {
        element: CodeElement::new(format!("{}.{}", owner, attr.name), signature.clone()),
        range: model.attribute_range(r),
        label: signature,
        owner,
    }
}

fn pair_views(before: &Model, after: &Model, on: &DeclarationPair) -> (Resolved, Resolved, &'static str) {
    match *on {
        DeclarationPair::Type { before: b, after: a } => (type_view(before, b), type_view(after, a), "class"),
        DeclarationPair::Operation { before: b, after: a } => {
            (operation_view(before, b), operation_view(after, a), "method")
        }
        DeclarationPair::Attribute { before: b, after: a } => {
            (attribute_view(before, b), attribute_view(after, a), "attribute")
        }
    }
}

fn param(p: &Parameter) -> String {
    format!("{} {}", p.display_type(), p.name)
}

/// Sides collected while rendering
struct Sides {
    before: Vec<Resolved>,
    after: Vec<Resolved>,
}

impl Sides {
    fn of(before: Resolved, after: Resolved) -> Self {
        Self {
            before: vec![before],
            after: vec![after],
        }
    }
}

pub fn build_report(refactoring: &Refactoring, before: &Model, after: &Model) -> RefactoringReport {
    let kind = refactoring.kind();
    let name = kind.display_name();
    let op_pair = |b: OperationRef, a: OperationRef| Sides::of(operation_view(before, b), operation_view(after, a));
    let attr_pair = |b: AttributeRef, a: AttributeRef| Sides::of(attribute_view(before, b), attribute_view(after, a));

    let (sides, description) = match refactoring {
        Refactoring::RenameClass { before: b, after: a }
        | Refactoring::MoveClass { before: b, after: a }
        | Refactoring::MoveAndRenameClass { before: b, after: a } => {
            let sides = Sides::of(type_view(before, *b), type_view(after, *a));
            let verb = match refactoring {
                Refactoring::RenameClass { .. } => "renamed to",
                Refactoring::MoveClass { .. } => "moved to",
                _ => "moved and renamed to",
            };
            let text = format!("{} {} {} {}", name, sides.before[0].label, verb, sides.after[0].label);
            (sides, text)
        }

        Refactoring::ExtractSuperclass { extracted, from } | Refactoring::ExtractInterface { extracted, from } => {
            let sources: Vec<Resolved> = from.iter().map(|r| type_view(before, *r)).collect();
            let target = type_view(after, *extracted);
            let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
            let text = format!("{} {} from classes [{}]", name, target.label, labels.join(", "));
            (
                Sides {
                    before: sources,
                    after: vec![target],
                },
                text,
            )
        }

        Refactoring::RenameOperation { before: b, after: a, .. } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} renamed to {} in class {}",
                name, sides.before[0].label, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::MoveOperation { before: b, after: a, .. }
        | Refactoring::MoveAndRenameOperation { before: b, after: a, .. }
        | Refactoring::PullUpOperation { before: b, after: a, .. }
        | Refactoring::PushDownOperation { before: b, after: a, .. } => {
            let sides = op_pair(*b, *a);
            let verb = match refactoring {
                Refactoring::PullUpOperation { .. } => "pulled up",
                Refactoring::PushDownOperation { .. } => "pushed down",
                Refactoring::MoveAndRenameOperation { .. } => "moved and renamed",
                _ => "moved",
            };
            let text = format!(
                "{} {} from class {} {} to {} from class {}",
                name, sides.before[0].label, sides.before[0].owner, verb, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }

        Refactoring::ExtractOperation {
            source_before,
            source_after,
            extracted,
            ..
        }
        | Refactoring::ExtractAndMoveOperation {
            source_before,
            source_after,
            extracted,
            ..
        } => {
            let source = operation_view(before, *source_before);
            let caller = operation_view(after, *source_after);
            let new_op = operation_view(after, *extracted);
            let text = format!(
                "{} {} extracted from {} in class {}",
                name, new_op.label, source.label, source.owner
            );
            (
                Sides {
                    before: vec![source],
                    after: vec![new_op, caller],
                },
                text,
            )
        }

        Refactoring::InlineOperation {
            inlined,
            target_before,
            target_after,
            ..
        }
        | Refactoring::MoveAndInlineOperation {
            inlined,
            target_before,
            target_after,
            ..
        } => {
            let gone = operation_view(before, *inlined);
            let target = operation_view(before, *target_before);
            let result = operation_view(after, *target_after);
            let text = format!(
                "{} {} inlined to {} in class {}",
                name, gone.label, result.label, result.owner
            );
            (
                Sides {
                    before: vec![gone, target],
                    after: vec![result],
                },
                text,
            )
        }

        Refactoring::MergeOperation { merged, into, .. } => {
            let sources: Vec<Resolved> = merged.iter().map(|r| operation_view(before, *r)).collect();
            let target = operation_view(after, *into);
            let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
            let text = format!(
                "{} [{}] to {} in class {}",
                name,
                labels.join(", "),
                target.label,
                target.owner
            );
            (
                Sides {
                    before: sources,
                    after: vec![target],
                },
                text,
            )
        }
        Refactoring::SplitOperation { source, into, .. } => {
            let source = operation_view(before, *source);
            let targets: Vec<Resolved> = into.iter().map(|r| operation_view(after, *r)).collect();
            let labels: Vec<&str> = targets.iter().map(|s| s.label.as_str()).collect();
            let text = format!(
                "{} {} to [{}] in class {}",
                name,
                source.label,
                labels.join(", "),
                source.owner
            );
            (
                Sides {
                    before: vec![source],
                    after: targets,
                },
                text,
            )
        }
        Refactoring::ParameterizeTest {
            tests,
            into,
            parameters,
            ..
        } => {
            let sources: Vec<Resolved> = tests.iter().map(|r| operation_view(before, *r)).collect();
            let target = operation_view(after, *into);
            let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
            let text = format!(
                "{} [{}] to {} with parameters ({}) in class {}",
                name,
                labels.join(", "),
                target.label,
                parameters.join(", "),
                target.owner
            );
            (
                Sides {
                    before: sources,
                    after: vec![target],
                },
                text,
            )
        }
        Refactoring::MoveCode {
            source_before,
            source_after,
            target_before,
            target_after,
            ..
        } => {
            let from = operation_view(before, *source_before);
            let to = operation_view(after, *target_after);
            let text = format!(
                "{} from {} to {} in class {}",
                name, from.label, to.label, to.owner
            );
            (
                Sides {
                    before: vec![from, operation_view(before, *target_before)],
                    after: vec![operation_view(after, *source_after), to],
                },
                text,
            )
        }

        Refactoring::ChangeReturnType { before: b, after: a, from, to } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} to {} in method {} from class {}",
                name, from, to, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::AddParameter { before: b, after: a, parameter }
        | Refactoring::RemoveParameter { before: b, after: a, parameter } => {
            let sides = op_pair(*b, *a);
            let preposition = if matches!(refactoring, Refactoring::AddParameter { .. }) {
                "in"
            } else {
                "from"
            };
            let text = format!(
                "{} {} {} method {} from class {}",
                name,
                param(parameter),
                preposition,
                sides.after[0].label,
                sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::RenameParameter { before: b, after: a, from, to }
        | Refactoring::ChangeParameterType { before: b, after: a, from, to } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} to {} in method {} from class {}",
                name,
                param(from),
                param(to),
                sides.after[0].label,
                sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::ReorderParameter { before: b, after: a } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} in method {} from class {}",
                name, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::AddThrownExceptionType { before: b, after: a, exception }
        | Refactoring::RemoveThrownExceptionType { before: b, after: a, exception } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} in method {} from class {}",
                name, exception, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }

        Refactoring::RenameAttribute { before: b, after: a } => {
            let sides = attr_pair(*b, *a);
            let text = format!(
                "{} {} to {} in class {}",
                name, sides.before[0].label, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::MoveAttribute { before: b, after: a }
        | Refactoring::MoveAndRenameAttribute { before: b, after: a }
        | Refactoring::PullUpAttribute { before: b, after: a }
        | Refactoring::PushDownAttribute { before: b, after: a } => {
            let sides = attr_pair(*b, *a);
            let text = format!(
                "{} {} from class {} to {} from class {}",
                name, sides.before[0].label, sides.before[0].owner, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::ChangeAttributeType { before: b, after: a, from, to } => {
            let sides = attr_pair(*b, *a);
            let attr = after.attribute(*a);
            let text = format!(
                "{} {} : {} to {} : {} in class {}",
                name, attr.name, from, attr.name, to, sides.after[0].owner
            );
            (sides, text)
        }

        Refactoring::AddAnnotation { on, annotation } | Refactoring::RemoveAnnotation { on, annotation } => {
            let (b, a, element) = pair_views(before, after, on);
            let preposition = if matches!(refactoring, Refactoring::AddAnnotation { .. }) {
                "in"
            } else {
                "from"
            };
            let text = format!("{} {} {} {} {}", name, annotation, preposition, element, a.label);
            (Sides::of(b, a), text)
        }
        Refactoring::ModifyAnnotation { on, from, to } => {
            let (b, a, element) = pair_views(before, after, on);
            let text = format!("{} {} to {} in {} {}", name, from, to, element, a.label);
            (Sides::of(b, a), text)
        }
        Refactoring::ChangeAccessModifier { on, from, to } => {
            let (b, a, element) = pair_views(before, after, on);
            let text = format!("{} {} to {} in {} {}", name, from, to, element, a.label);
            (Sides::of(b, a), text)
        }

        Refactoring::ExtractVariable {
            before: b,
            after: a,
            name: variable,
            type_name,
            ..
        }
        | Refactoring::InlineVariable {
            before: b,
            after: a,
            name: variable,
            type_name,
            ..
        } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} : {} in method {} from class {}",
                name, variable, type_name, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::RenameVariable { before: b, after: a, from, to } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} to {} in method {} from class {}",
                name, from, to, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
        Refactoring::ChangeVariableType {
            before: b,
            after: a,
            name: variable,
            from,
            to,
        } => {
            let sides = op_pair(*b, *a);
            let text = format!(
                "{} {} : {} to {} : {} in method {} from class {}",
                name, variable, from, variable, to, sides.after[0].label, sides.after[0].owner
            );
            (sides, text)
        }
    };

    let split = |side: Vec<Resolved>| -> (Vec<CodeElement>, Vec<CodeRange>) {
        side.into_iter().map(|r| (r.element, r.range)).unzip()
    };
    let (before_elements, before_ranges) = split(sides.before);
    let (after_elements, after_ranges) = split(sides.after);
    RefactoringReport {
        kind,
        name: name.to_string(),
        description,
        before_elements,
        after_elements,
        before_ranges,
        after_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::builders::{OperationBuilder, TypeBuilder};
    use crate::shared::models::Visibility;
    use pretty_assertions::assert_eq;

    fn models() -> (Model, Model) {
        let before = Model::new(vec![TypeBuilder::new("com.acme.Billing")
            .file("src/Billing.java")
            .operation(OperationBuilder::new("calc").param("int", "n").returns("int").lines(3, 7).build())
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("com.acme.Billing")
            .file("src/Billing.java")
            .operation(OperationBuilder::new("compute").param("int", "n").returns("int").lines(4, 8).build())
            .build()]);
        (before, after)
    }

    #[test]
    fn test_rename_operation_report() {
        let (before, after) = models();
        let op = OperationRef::new(TypeRef(0), 0);
        let report = build_report(
            &Refactoring::RenameOperation {
                before: op,
                after: op,
                mapper: None,
            },
            &before,
            &after,
        );
        assert_eq!(report.name, "Rename Method");
        assert_eq!(
            report.description,
            "Rename Method calc(int) : int renamed to compute(int) : int in class com.acme.Billing"
        );
        assert_eq!(
            report.before_elements,
            vec![CodeElement::new("com.acme.Billing.calc", "calc(int) : int")]
        );
        assert_eq!(report.after_ranges[0].start_line, 4);
        assert_eq!(report.after_ranges[0].file_path, "src/Billing.java");
    }

    #[test]
    fn test_extract_superclass_report() {
        let before = Model::new(vec![TypeBuilder::new("a.Circle").build(), TypeBuilder::new("a.Square").build()]);
        let after = Model::new(vec![
            TypeBuilder::new("a.Circle").superclass("a.Shape").build(),
            TypeBuilder::new("a.Square").superclass("a.Shape").build(),
            TypeBuilder::new("a.Shape").build(),
        ]);
        let report = build_report(
            &Refactoring::ExtractSuperclass {
                extracted: TypeRef(2),
                from: vec![TypeRef(0), TypeRef(1)],
            },
            &before,
            &after,
        );
        assert_eq!(report.description, "Extract Superclass a.Shape from classes [a.Circle, a.Square]");
        assert_eq!(report.before_elements.len(), 2);
        assert_eq!(report.after_elements[0].signature, "class Shape");
    }

    #[test]
    fn test_access_modifier_report() {
        let (before, after) = models();
        let report = build_report(
            &Refactoring::ChangeAccessModifier {
                on: DeclarationPair::Type {
                    before: TypeRef(0),
                    after: TypeRef(0),
                },
                from: Visibility::Public,
                to: Visibility::Package,
            },
            &before,
            &after,
        );
        assert_eq!(
            report.description,
            "Change Class Access Modifier public to package in class com.acme.Billing"
        );
        assert_eq!(report.before_elements[0].signature, "class Billing");
    }
}
