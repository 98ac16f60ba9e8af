//! Statements and operation bodies

use super::expression::{Expression, ExpressionKind};
use super::span::Span;
use serde::{Deserialize, Serialize};

/// Statement kind (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatementKind {
    Expression,
    If,
    For,
    ForEach,
    While,
    DoWhile,
    Switch,
    Try,
    Block,
    Return,
    Throw,
    Break,
    Continue,
    VariableDeclaration,
    Synchronized,
    Labeled,
}

impl StatementKind {
    /// Kinds that own child statement lists
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            StatementKind::If
                | StatementKind::For
                | StatementKind::ForEach
                | StatementKind::While
                | StatementKind::DoWhile
                | StatementKind::Switch
                | StatementKind::Try
                | StatementKind::Block
                | StatementKind::Synchronized
                | StatementKind::Labeled
        )
    }

    /// Kinds whose first expression is a controlling condition
    pub fn has_condition(&self) -> bool {
        matches!(
            self,
            StatementKind::If | StatementKind::While | StatementKind::DoWhile
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Expression => "expression",
            StatementKind::If => "if",
            StatementKind::For => "for",
            StatementKind::ForEach => "foreach",
            StatementKind::While => "while",
            StatementKind::DoWhile => "do-while",
            StatementKind::Switch => "switch",
            StatementKind::Try => "try",
            StatementKind::Block => "block",
            StatementKind::Return => "return",
            StatementKind::Throw => "throw",
            StatementKind::Break => "break",
            StatementKind::Continue => "continue",
            StatementKind::VariableDeclaration => "variable-declaration",
            StatementKind::Synchronized => "synchronized",
            StatementKind::Labeled => "labeled",
        }
    }
}

/// Role of a child statement list inside its composite parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BranchKind {
    Then,
    Else,
    Body,
    Try,
    Catch,
    Finally,
    Case,
    Default,
}

/// A child statement list (then/else branch, loop body, catch block, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub kind: BranchKind,
    /// Clause header such as `catch(IOException e)` or `case 1:`
    #[serde(default)]
    pub header: Option<String>,
    pub statements: Vec<Statement>,
}

impl Branch {
    pub fn new(kind: BranchKind, statements: Vec<Statement>) -> Self {
        Self {
            kind,
            header: None,
            statements,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// Local variable declared by a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVariable {
    pub name: String,
    pub type_name: String,
}

/// A statement node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub kind: StatementKind,
    /// Source text; for composites only the header (`if(x > 0)`)
    pub text: String,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub variables: Vec<LocalVariable>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            expressions: Vec::new(),
            variables: Vec::new(),
            branches: Vec::new(),
            span: Span::zero(),
        }
    }

    pub fn with_expression(mut self, expr: Expression) -> Self {
        self.expressions.push(expr);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.variables.push(LocalVariable {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }

    /// Direct children across all branches, in branch order
    pub fn children(&self) -> impl Iterator<Item = &Statement> {
        self.branches.iter().flat_map(|b| b.statements.iter())
    }

    /// Controlling condition for if/while/do-while/switch
    pub fn condition(&self) -> Option<&Expression> {
        if self.kind.has_condition() || self.kind == StatementKind::Switch {
            self.expressions.first()
        } else {
            None
        }
    }

    /// The single expression carried by leaf statements (`foo(x);`, `return e;`,
    /// initializer of `T v = e;`)
    pub fn core_expression(&self) -> Option<&Expression> {
        match self.kind {
            StatementKind::Expression
            | StatementKind::Return
            | StatementKind::Throw
            | StatementKind::VariableDeclaration => self.expressions.first(),
            _ => None,
        }
    }

    /// Every invocation or object creation contained in this statement's own expressions
    pub fn invocations(&self) -> Vec<&Expression> {
        self.expressions
            .iter()
            .flat_map(|e| e.descendants())
            .filter(|e| e.is_invocation() || e.is_object_creation())
            .collect()
    }

    /// Names of variables referenced by this statement's own expressions
    pub fn referenced_variables(&self) -> Vec<&str> {
        self.expressions
            .iter()
            .flat_map(|e| e.descendants())
            .filter_map(|e| match &e.kind {
                ExpressionKind::Variable { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Identity-agnostic statement shape
    pub fn shape(&self) -> String {
        let inner: Vec<String> = self.expressions.iter().map(|e| e.shape()).collect();
        format!("{}[{}]", self.kind.as_str(), inner.join(";"))
    }

    /// Number of statements in this subtree, including `self`
    pub fn subtree_size(&self) -> usize {
        1 + self.children().map(|c| c.subtree_size()).sum::<usize>()
    }
}

/// Pre-order walk record with stable tie-breaking coordinates
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a> {
    pub statement: &'a Statement,
    /// Nesting depth; top-level statements are at depth 0
    pub depth: u32,
    /// Position among the siblings of the same branch
    pub sibling_index: u32,
    /// Pre-order index of the parent statement
    pub parent: Option<usize>,
    /// Index of the parent's branch holding this statement
    pub branch: Option<usize>,
}

/// Operation body: an ordered, nested statement tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub statements: Vec<Statement>,
}

impl Body {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Total number of statements at every depth
    pub fn statement_count(&self) -> usize {
        self.statements.iter().map(|s| s.subtree_size()).sum()
    }

    /// Pre-order walk; the returned index of each entry is its statement id
    pub fn walk(&self) -> Vec<WalkEntry<'_>> {
        let mut out = Vec::with_capacity(self.statement_count());
        for (i, stmt) in self.statements.iter().enumerate() {
            walk_into(stmt, 0, i as u32, None, None, &mut out);
        }
        out
    }
}

fn walk_into<'a>(
    stmt: &'a Statement,
    depth: u32,
    sibling_index: u32,
    parent: Option<usize>,
    branch: Option<usize>,
    out: &mut Vec<WalkEntry<'a>>,
) {
    let me = out.len();
    out.push(WalkEntry {
        statement: stmt,
        depth,
        sibling_index,
        parent,
        branch,
    });
    for (b, br) in stmt.branches.iter().enumerate() {
        for (i, child) in br.statements.iter().enumerate() {
            walk_into(child, depth + 1, i as u32, Some(me), Some(b), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::builders::{call, declare, expr_stmt, if_else, infix, lit, var};

    fn sample() -> Body {
        Body::new(vec![
            declare("int", "x", lit("1")),
            if_else(
                infix(var("x"), ">", lit("0")),
                vec![expr_stmt(call("foo", vec![var("x")]))],
                vec![expr_stmt(call("bar", vec![])), expr_stmt(call("baz", vec![]))],
            ),
        ])
    }

    #[test]
    fn test_walk_depth_and_parent() {
        let body = sample();
        let walk = body.walk();
        assert_eq!(walk.len(), 5);
        assert_eq!(body.statement_count(), 5);
        assert_eq!(walk[1].statement.kind, StatementKind::If);
        assert_eq!(walk[2].depth, 1);
        assert_eq!(walk[2].parent, Some(1));
        assert_eq!(walk[2].branch, Some(0));
        assert_eq!(walk[4].sibling_index, 1);
        assert_eq!(walk[4].branch, Some(1));
    }

    #[test]
    fn test_condition_only_for_conditional_kinds() {
        let body = sample();
        assert_eq!(
            body.statements[1].condition().map(|c| c.text.as_str()),
            Some("x > 0")
        );
        assert!(body.statements[0].condition().is_none());
        assert_eq!(
            body.statements[0].core_expression().map(|c| c.text.as_str()),
            Some("1")
        );
    }

    #[test]
    fn test_invocations_collects_nested_calls() {
        let stmt = expr_stmt(call("foo", vec![call("bar", vec![var("x")])]));
        let names: Vec<_> = stmt
            .invocations()
            .iter()
            .filter_map(|e| e.invoked_name())
            .collect();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(stmt.referenced_variables(), vec!["x"]);
    }
}
