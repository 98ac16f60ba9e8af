//! Expressions (sub-statement units)

use super::span::Span;
use serde::{Deserialize, Serialize};

/// Literal category, used by the replacement classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    String,
    Char,
    Number,
    Boolean,
    Null,
}

impl LiteralKind {
    /// Infer the literal category from its source text
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('"') {
            LiteralKind::String
        } else if trimmed.starts_with('\'') {
            LiteralKind::Char
        } else if trimmed == "true" || trimmed == "false" {
            LiteralKind::Boolean
        } else if trimmed == "null" {
            LiteralKind::Null
        } else {
            LiteralKind::Number
        }
    }
}

/// Expression kind
///
/// Invocation operands are `[receiver?, arguments...]`; `has_receiver` tells
/// the two apart. Object creations carry only arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionKind {
    Invocation { name: String, has_receiver: bool },
    ObjectCreation { type_name: String },
    Literal(LiteralKind),
    Variable { name: String },
    FieldAccess { name: String },
    ArrayAccess,
    Lambda { parameters: Vec<String> },
    Ternary,
    Cast { type_name: String },
    Infix { operator: String },
    Prefix { operator: String },
    Postfix { operator: String },
    Assignment { operator: String },
    Other,
}

/// An expression node with its normalized source text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Source text as produced by the front end; tokenized before comparison
    pub text: String,
    #[serde(default)]
    pub operands: Vec<Expression>,
    #[serde(default)]
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, text: impl Into<String>, operands: Vec<Expression>) -> Self {
        Self {
            kind,
            text: text.into(),
            operands,
            span: Span::zero(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self.kind, ExpressionKind::Invocation { .. })
    }

    pub fn is_object_creation(&self) -> bool {
        matches!(self.kind, ExpressionKind::ObjectCreation { .. })
    }

    /// Invoked method name, if this is an invocation
    pub fn invoked_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Invocation { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn receiver(&self) -> Option<&Expression> {
        match &self.kind {
            ExpressionKind::Invocation {
                has_receiver: true, ..
            } => self.operands.first(),
            _ => None,
        }
    }

    /// Call arguments for invocations and object creations; empty otherwise
    pub fn arguments(&self) -> &[Expression] {
        match &self.kind {
            ExpressionKind::Invocation { has_receiver, .. } => {
                if *has_receiver && !self.operands.is_empty() {
                    &self.operands[1..]
                } else {
                    &self.operands
                }
            }
            ExpressionKind::ObjectCreation { .. } => &self.operands,
            _ => &[],
        }
    }

    /// Pre-order traversal including `self`
    pub fn descendants(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            out.push(expr);
            for child in expr.operands.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Identity-agnostic shape: kind tags and operators, no identifiers or literal values
    pub fn shape(&self) -> String {
        let tag = match &self.kind {
            ExpressionKind::Invocation { .. } => "call".to_string(),
            ExpressionKind::ObjectCreation { .. } => "new".to_string(),
            ExpressionKind::Literal(kind) => format!("lit:{:?}", kind),
            ExpressionKind::Variable { .. } => "var".to_string(),
            ExpressionKind::FieldAccess { .. } => "field".to_string(),
            ExpressionKind::ArrayAccess => "index".to_string(),
            ExpressionKind::Lambda { parameters } => format!("lambda/{}", parameters.len()),
            ExpressionKind::Ternary => "cond".to_string(),
            ExpressionKind::Cast { .. } => "cast".to_string(),
            ExpressionKind::Infix { operator } => format!("infix{}", operator),
            ExpressionKind::Prefix { operator } => format!("prefix{}", operator),
            ExpressionKind::Postfix { operator } => format!("postfix{}", operator),
            ExpressionKind::Assignment { operator } => format!("assign{}", operator),
            ExpressionKind::Other => "expr".to_string(),
        };
        if self.operands.is_empty() {
            tag
        } else {
            let inner: Vec<String> = self.operands.iter().map(|o| o.shape()).collect();
            format!("{}({})", tag, inner.join(","))
        }
    }
}
