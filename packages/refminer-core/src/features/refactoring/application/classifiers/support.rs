//! Helpers shared by the classifiers

use crate::features::body_mapper::{BodyMapping, FragmentTree, StatementId, Substitution};
use crate::features::refactoring::domain::{DeclarationPair, Refactoring};
use crate::shared::models::{Annotation, Expression, ExpressionKind, Operation, Statement, StatementKind};

/// Argument count accepted by `op`, honoring a trailing varargs parameter
pub fn arity_matches(op: &Operation, arguments: usize) -> bool {
    let n = op.parameters.len();
    match op.parameters.last() {
        Some(last) if last.varargs => arguments + 1 >= n,
        _ => arguments == n,
    }
}

/// An invocation of a given operation inside one statement
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'e> {
    pub statement: StatementId,
    pub call: &'e Expression,
}

/// Invocations of `callee` (by name and arity) in the tree, in pre-order
pub fn call_sites<'e>(tree: &FragmentTree<'e>, callee: &Operation) -> Vec<CallSite<'e>> {
    let mut sites = Vec::new();
    for node in tree.nodes() {
        let statement: &'e Statement = node.statement;
        for expr in statement.expressions.iter().flat_map(|e| e.descendants()) {
            if expr.invoked_name() == Some(callee.name.as_str())
                && arity_matches(callee, expr.arguments().len())
            {
                sites.push(CallSite {
                    statement: node.id,
                    call: expr,
                });
            }
        }
    }
    sites
}

/// Empty substitution for trees compared as written
pub fn no_substitution() -> Substitution {
    Substitution::default()
}

/// Statements that carry no evidence on their own
pub fn is_trivial(statement: &Statement) -> bool {
    match statement.kind {
        StatementKind::Break | StatementKind::Continue | StatementKind::Block => true,
        StatementKind::Return => match statement.core_expression() {
            None => true,
            Some(expr) => matches!(
                expr.kind,
                ExpressionKind::Variable { .. } | ExpressionKind::Literal(_)
            ),
        },
        _ => false,
    }
}

/// At least one edge whose before statement is not trivial
pub fn has_substantive_edge(mapping: &BodyMapping, before: &FragmentTree<'_>) -> bool {
    mapping
        .edges
        .iter()
        .any(|e| !is_trivial(before.node(e.before.statement).statement))
}

/// True when any operation in `callers` invokes any operation in `callees`
pub fn any_calls(callers: &[&Operation], callees: &[&Operation]) -> bool {
    callers.iter().any(|caller| {
        let subst = no_substitution();
        let tree = FragmentTree::for_body(caller.body.as_ref(), &subst);
        callees
            .iter()
            .any(|callee| !std::ptr::eq(*caller, *callee) && !call_sites(&tree, callee).is_empty())
    })
}

/// Add/remove/modify annotation refactorings, matched by annotation name
pub fn annotation_changes(on: DeclarationPair, before: &[Annotation], after: &[Annotation]) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for b in before {
        match after.iter().find(|a| a.name == b.name) {
            Some(a) if a.arguments != b.arguments => out.push(Refactoring::ModifyAnnotation {
                on,
                from: b.clone(),
                to: a.clone(),
            }),
            Some(_) => {}
            None => out.push(Refactoring::RemoveAnnotation {
                on,
                annotation: b.clone(),
            }),
        }
    }
    for a in after {
        if !before.iter().any(|b| b.name == a.name) {
            out.push(Refactoring::AddAnnotation {
                on,
                annotation: a.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::builders::{call, expr_stmt, lit, ret, var, OperationBuilder};
    use crate::shared::models::{Body, TypeRef};

    #[test]
    fn test_arity_with_varargs() {
        let op = OperationBuilder::new("log").param("String", "fmt").param("Object", "args").build();
        assert!(arity_matches(&op, 2));
        assert!(!arity_matches(&op, 3));

        let op = OperationBuilder::new("log")
            .param("String", "fmt")
            .varargs_param("Object", "args")
            .build();
        assert!(arity_matches(&op, 1));
        assert!(arity_matches(&op, 4));
        assert!(!arity_matches(&op, 0));
    }

    #[test]
    fn test_call_sites_by_name_and_arity() {
        let body = Body::new(vec![
            expr_stmt(call("helper", vec![var("a")])),
            expr_stmt(call("helper", vec![])),
            ret(call("other", vec![call("helper", vec![var("b")])])),
        ]);
        let subst = no_substitution();
        let tree = FragmentTree::build(&body, &subst);
        let callee = OperationBuilder::new("helper").param("int", "x").build();
        let sites = call_sites(&tree, &callee);
        let ids: Vec<StatementId> = sites.iter().map(|s| s.statement).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_trivial_statements() {
        assert!(is_trivial(&ret(var("x"))));
        assert!(is_trivial(&ret(lit("0"))));
        assert!(!is_trivial(&ret(call("compute", vec![]))));
        assert!(!is_trivial(&expr_stmt(call("run", vec![]))));
    }

    #[test]
    fn test_annotation_changes() {
        let on = DeclarationPair::Type {
            before: TypeRef(0),
            after: TypeRef(0),
        };
        let before = vec![
            Annotation::new("Deprecated"),
            Annotation::new("SuppressWarnings").with_arguments("\"unchecked\""),
        ];
        let after = vec![
            Annotation::new("SuppressWarnings").with_arguments("\"all\""),
            Annotation::new("Entity"),
        ];
        let changes = annotation_changes(on, &before, &after);
        assert_eq!(changes.len(), 3);
        assert!(matches!(&changes[0], Refactoring::RemoveAnnotation { annotation, .. } if annotation.name == "Deprecated"));
        assert!(matches!(&changes[1], Refactoring::ModifyAnnotation { .. }));
        assert!(matches!(&changes[2], Refactoring::AddAnnotation { annotation, .. } if annotation.name == "Entity"));
    }
}
