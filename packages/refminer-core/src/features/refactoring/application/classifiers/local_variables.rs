//! Extract Variable and Inline Variable
//!
//! Detection is textual over the two bodies of a matched operation: a
//! declaration present on one side only, whose initializer substituted for
//! the variable turns a statement of that side into one of the other side.

use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::features::replacement::infrastructure::tokenizer::substitute;
use crate::features::replacement::{canonical_text, tokenize, Token, TokenKind};
use crate::shared::models::{Operation, OperationRef, Statement, StatementKind};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

struct Local<'a> {
    index: usize,
    name: &'a str,
    type_name: &'a str,
    initializer: Vec<Token>,
}

/// Statements of one body in pre-order with their canonical text
struct BodyText<'a> {
    statements: Vec<&'a Statement>,
    canonical: Vec<String>,
    declared: FxHashSet<&'a str>,
}

impl<'a> BodyText<'a> {
    fn new(op: &'a Operation) -> Self {
        let statements: Vec<&Statement> = op
            .body
            .as_ref()
            .map(|body| body.walk().into_iter().map(|e| e.statement).collect())
            .unwrap_or_default();
        let canonical = statements.iter().map(|s| canonical_text(&tokenize(&s.text))).collect();
        let mut declared: FxHashSet<&str> = op.parameter_names().into_iter().collect();
        for s in statements.iter().copied() {
            declared.extend(s.variables.iter().map(|v| v.name.as_str()));
        }
        Self {
            statements,
            canonical,
            declared,
        }
    }

    /// Single-variable declarations with an initializer
    fn locals(&self) -> Vec<Local<'a>> {
        self.statements
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| s.kind == StatementKind::VariableDeclaration && s.variables.len() == 1)
            .filter_map(|(index, s)| {
                let init = s.expressions.first()?;
                let initializer = tokenize(&init.text);
                if initializer.is_empty() {
                    return None;
                }
                Some(Local {
                    index,
                    name: &s.variables[0].name,
                    type_name: &s.variables[0].type_name,
                    initializer,
                })
            })
            .collect()
    }

    fn contains(&self, text: &str) -> bool {
        self.canonical.iter().any(|c| c == text)
    }
}

/// True when some statement of `host`, with `local` replaced by its
/// initializer, reads as a statement of `other`
fn initializer_takes_place(host: &BodyText<'_>, local: &Local<'_>, other: &BodyText<'_>) -> bool {
    let mut wrapped = Vec::with_capacity(local.initializer.len() + 2);
    wrapped.push(Token::new(TokenKind::Punctuation, "("));
    wrapped.extend(local.initializer.iter().cloned());
    wrapped.push(Token::new(TokenKind::Punctuation, ")"));

    host.statements.iter().enumerate().any(|(i, s)| {
        if i == local.index {
            return false;
        }
        let tokens = tokenize(&s.text);
        if !tokens.iter().any(|t| t.is_identifier() && t.is(local.name)) {
            return false;
        }
        [&local.initializer, &wrapped].into_iter().any(|replacement| {
            let map: FxHashMap<String, Vec<Token>> =
                std::iter::once((local.name.to_string(), replacement.clone())).collect();
            let replaced = canonical_text(&substitute(&tokens, &map));
            replaced != host.canonical[i] && other.contains(&replaced)
        })
    })
}

fn emit(
    out: &mut Vec<Refactoring>,
    seen: &mut BTreeSet<(bool, OperationRef, String)>,
    extract: bool,
    (before, after): (OperationRef, OperationRef),
    local: &Local<'_>,
) {
    if !seen.insert((extract, after, local.name.to_string())) {
        return;
    }
    let name = local.name.to_string();
    let type_name = local.type_name.to_string();
    let initializer = canonical_text(&local.initializer);
    out.push(if extract {
        Refactoring::ExtractVariable {
            before,
            after,
            name,
            type_name,
            initializer,
        }
    } else {
        Refactoring::InlineVariable {
            before,
            after,
            name,
            type_name,
            initializer,
        }
    });
}

pub fn classify(ctx: &DetectionContext<'_>) -> Vec<Refactoring> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    for m in &ctx.diff.operation_matches {
        let (bop, aop) = (ctx.before.operation(m.before), ctx.after.operation(m.after));
        if !bop.has_body() || !aop.has_body() {
            continue;
        }
        let before = BodyText::new(bop);
        let after = BodyText::new(aop);

        for local in after.locals() {
            if !before.declared.contains(local.name) && initializer_takes_place(&after, &local, &before) {
                emit(&mut out, &mut seen, true, (m.before, m.after), &local);
            }
        }
        for local in before.locals() {
            if !after.declared.contains(local.name) && initializer_takes_place(&before, &local, &after) {
                emit(&mut out, &mut seen, false, (m.before, m.after), &local);
            }
        }
    }
    out
}
