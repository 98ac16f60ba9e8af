//! Flattened statement trees
//!
//! Each body is walked once in pre-order. Every node carries its canonical
//! token sequence (with parameter→argument substitution applied), the text of
//! its whole subtree for composite exact matching, and the call expressions it
//! hosts for the leaf pass.

use crate::features::body_mapper::domain::StatementId;
use crate::features::replacement::infrastructure::tokenizer::substitute;
use crate::features::replacement::{canonical_text, tokenize, Token};
use crate::shared::models::{Body, Expression, Statement};
use rustc_hash::FxHashMap;

/// Identifier → replacement tokens (parameter name → argument text)
pub type Substitution = FxHashMap<String, Vec<Token>>;

/// Build a substitution from formal parameter names and call-site arguments
///
/// Extra arguments (varargs) are ignored; missing ones leave the parameter as is.
pub fn substitution_for_call(parameters: &[&str], arguments: &[Expression]) -> Substitution {
    parameters
        .iter()
        .zip(arguments.iter())
        .filter(|(p, a)| **p != a.text)
        .map(|(p, a)| (p.to_string(), tokenize(&a.text)))
        .collect()
}

/// One expression inside a statement, addressed by pre-order index
#[derive(Debug, Clone)]
pub struct ExpressionFragment {
    pub index: u32,
    pub text: String,
    pub is_call: bool,
}

#[derive(Debug, Clone)]
pub struct FragmentNode<'a> {
    pub id: StatementId,
    pub statement: &'a Statement,
    pub depth: u32,
    pub sibling_index: u32,
    pub parent: Option<StatementId>,
    /// Branch of the parent holding this node
    pub branch: Option<usize>,
    pub children: Vec<StatementId>,
    /// Exclusive end of this node's pre-order range
    pub subtree_end: StatementId,
    pub tokens: Vec<Token>,
    pub text: String,
    pub subtree_text: String,
    pub expressions: Vec<ExpressionFragment>,
}

impl<'a> FragmentNode<'a> {
    pub fn is_composite(&self) -> bool {
        self.statement.is_composite()
    }

    /// Descendant ids, excluding `self`
    pub fn descendants(&self) -> std::ops::Range<StatementId> {
        self.id + 1..self.subtree_end
    }

    pub fn descendant_count(&self) -> usize {
        (self.subtree_end - self.id - 1) as usize
    }

    /// The statement's own call expression (`foo(x);`, `return foo(x);`,
    /// `T v = foo(x);`), if it has one
    pub fn core_call(&self) -> Option<&ExpressionFragment> {
        let core = self.statement.core_expression()?;
        if core.is_invocation() || core.is_object_creation() {
            self.expressions.first()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct FragmentTree<'a> {
    nodes: Vec<FragmentNode<'a>>,
}

impl<'a> FragmentTree<'a> {
    pub fn build(body: &'a Body, substitution: &Substitution) -> Self {
        let walk = body.walk();
        let mut nodes: Vec<FragmentNode<'a>> = walk
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let tokens = substitute(&tokenize(&entry.statement.text), substitution);
                let text = canonical_text(&tokens);
                FragmentNode {
                    id: i as StatementId,
                    statement: entry.statement,
                    depth: entry.depth,
                    sibling_index: entry.sibling_index,
                    parent: entry.parent.map(|p| p as StatementId),
                    branch: entry.branch,
                    children: Vec::new(),
                    subtree_end: i as StatementId + 1,
                    tokens,
                    text,
                    subtree_text: String::new(),
                    expressions: expression_fragments(entry.statement, substitution),
                }
            })
            .collect();

        for i in 0..nodes.len() {
            if let Some(p) = nodes[i].parent {
                nodes[p as usize].children.push(i as StatementId);
            }
        }

        // Children always follow their parent in pre-order
        for i in (0..nodes.len()).rev() {
            if let Some(&last) = nodes[i].children.last() {
                let end = nodes[last as usize].subtree_end;
                nodes[i].subtree_end = end;
            }
            let subtree_text = if nodes[i].is_composite() {
                let parts: Vec<String> = nodes[i]
                    .children
                    .iter()
                    .map(|&c| {
                        let child = &nodes[c as usize];
                        let header = child
                            .branch
                            .and_then(|b| nodes[i].statement.branches.get(b))
                            .and_then(|b| b.header.as_deref())
                            .unwrap_or("");
                        format!("{}#{} {}", child.branch.unwrap_or(0), header, child.subtree_text)
                    })
                    .collect();
                format!("{} {{ {} }}", nodes[i].text, parts.join(" ; "))
            } else {
                nodes[i].text.clone()
            };
            nodes[i].subtree_text = subtree_text;
        }

        Self { nodes }
    }

    /// Tree of an operation body; operations without a body yield an empty tree
    pub fn for_body(body: Option<&'a Body>, substitution: &Substitution) -> Self {
        match body {
            Some(b) => Self::build(b, substitution),
            None => Self { nodes: Vec::new() },
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: StatementId) -> &FragmentNode<'a> {
        &self.nodes[id as usize]
    }

    pub fn nodes(&self) -> &[FragmentNode<'a>] {
        &self.nodes
    }

    pub fn ids(&self) -> Vec<StatementId> {
        (0..self.nodes.len() as StatementId).collect()
    }

    pub fn is_ancestor(&self, ancestor: StatementId, id: StatementId) -> bool {
        ancestor < id && id < self.node(ancestor).subtree_end
    }

    /// Ids under one branch of a composite, pre-order
    pub fn branch_ids(&self, composite: StatementId, branch: usize) -> Vec<StatementId> {
        self.node(composite)
            .children
            .iter()
            .filter(|&&c| self.node(c).branch == Some(branch))
            .flat_map(|&c| c..self.node(c).subtree_end)
            .collect()
    }
}

fn expression_fragments(statement: &Statement, substitution: &Substitution) -> Vec<ExpressionFragment> {
    statement
        .expressions
        .iter()
        .flat_map(|e| e.descendants())
        .enumerate()
        .map(|(i, e)| ExpressionFragment {
            index: i as u32,
            text: canonical_text(&substitute(&tokenize(&e.text), substitution)),
            is_call: e.is_invocation() || e.is_object_creation(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::builders::{call, declare, expr_stmt, if_else, infix, lit, ret, var};

    fn body() -> Body {
        Body::new(vec![
            declare("int", "x", lit("1")),
            if_else(
                infix(var("x"), ">", lit("0")),
                vec![expr_stmt(call("foo", vec![var("x")]))],
                vec![ret(call("bar", vec![var("x")]))],
            ),
            expr_stmt(call("done", vec![])),
        ])
    }

    #[test]
    fn test_pre_order_ranges() {
        let body = body();
        let tree = FragmentTree::build(&body, &Substitution::default());
        assert_eq!(tree.len(), 5);
        let cond = tree.node(1);
        assert_eq!(cond.children, vec![2, 3]);
        assert_eq!(cond.subtree_end, 4);
        assert_eq!(cond.descendant_count(), 2);
        assert!(tree.is_ancestor(1, 3));
        assert!(!tree.is_ancestor(1, 4));
        assert_eq!(tree.branch_ids(1, 1), vec![3]);
    }

    #[test]
    fn test_canonical_text_and_core_call() {
        let body = body();
        let tree = FragmentTree::build(&body, &Substitution::default());
        assert_eq!(tree.node(0).text, "int x = 1 ;");
        assert!(tree.node(0).core_call().is_none());
        assert_eq!(tree.node(3).core_call().map(|e| e.text.as_str()), Some("bar ( x )"));
        assert!(tree.node(1).subtree_text.starts_with("if ( x > 0 ) {"));
    }

    #[test]
    fn test_substitution_applies_to_statements_and_expressions() {
        let body = body();
        let subst = substitution_for_call(&["x"], &[var("count")]);
        let tree = FragmentTree::build(&body, &subst);
        assert_eq!(tree.node(2).text, "foo ( count ) ;");
        assert_eq!(tree.node(3).expressions[0].text, "bar ( count )");
    }

    #[test]
    fn test_identity_substitution_is_skipped() {
        let subst = substitution_for_call(&["x", "y"], &[var("x"), lit("2")]);
        assert_eq!(subst.len(), 1);
        assert!(subst.contains_key("y"));
    }
}
