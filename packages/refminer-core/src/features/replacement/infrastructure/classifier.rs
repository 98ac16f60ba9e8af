//! Decision-tree classifier over token shape
//!
//! Same token count: positional diff, one replacement kind per differing
//! token. Different counts: LCS alignment, one replacement per diff hunk.
//! Bodies of tokens that no rule explains become `ExpressionReplaced`.

use super::similarity::{dice_from_common, lcs_alignment, multiset_dice, EditOp};
use super::tokenizer::{canonical_text, Token, TokenKind};
use crate::features::replacement::domain::{Replacement, ReplacementKind};

/// Result of comparing two token sequences
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// 1.0 for identical sequences, 0.0 for nothing in common
    pub similarity: f64,
    pub replacements: Vec<Replacement>,
}

impl Comparison {
    pub fn identical() -> Self {
        Self {
            similarity: 1.0,
            replacements: Vec::new(),
        }
    }

    pub fn is_identical(&self) -> bool {
        self.replacements.is_empty() && self.similarity >= 1.0
    }

    /// True when every replacement is one of `kinds`
    pub fn only(&self, kinds: &[ReplacementKind]) -> bool {
        self.replacements.iter().all(|r| kinds.contains(&r.kind))
    }
}

#[derive(Debug, Clone, Copy)]
struct Hunk {
    b_start: usize,
    b_end: usize,
    a_start: usize,
    a_end: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct CallArguments {
    name: String,
    args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReplacementClassifier {
    max_alignment_tokens: usize,
}

impl Default for ReplacementClassifier {
    fn default() -> Self {
        Self::new(400)
    }
}

impl ReplacementClassifier {
    pub fn new(max_alignment_tokens: usize) -> Self {
        Self {
            max_alignment_tokens,
        }
    }

    pub fn compare(&self, before: &[Token], after: &[Token]) -> Comparison {
        if before == after {
            return Comparison::identical();
        }
        if before.is_empty() || after.is_empty() {
            return Comparison {
                similarity: 0.0,
                replacements: vec![Replacement::new(
                    ReplacementKind::ExpressionReplaced,
                    canonical_text(before),
                    canonical_text(after),
                )],
            };
        }
        if let Some(reordered) = self.argument_reordering(before, after) {
            return reordered;
        }
        if before.len() == after.len() {
            return self.positional(before, after);
        }
        if before.len().max(after.len()) > self.max_alignment_tokens {
            return Comparison {
                similarity: multiset_dice(before, after),
                replacements: vec![Replacement::new(
                    ReplacementKind::ExpressionReplaced,
                    canonical_text(before),
                    canonical_text(after),
                )],
            };
        }
        self.aligned(before, after)
    }

    fn positional(&self, before: &[Token], after: &[Token]) -> Comparison {
        let mut replacements = Vec::new();
        let mut differing = 0usize;
        for i in 0..before.len() {
            if before[i] != after[i] {
                differing += 1;
                let kind = classify_pair(before, i, after, i);
                replacements.push(Replacement::new(
                    kind,
                    before[i].text.clone(),
                    after[i].text.clone(),
                ));
            }
        }
        Comparison {
            similarity: 1.0 - differing as f64 / before.len() as f64,
            replacements: dedup(replacements),
        }
    }

    fn aligned(&self, before: &[Token], after: &[Token]) -> Comparison {
        let ops = lcs_alignment(before, after);
        let common = ops
            .iter()
            .filter(|op| matches!(op, EditOp::Keep(..)))
            .count();

        let mut hunks = Vec::new();
        let mut open: Option<Hunk> = None;
        let (mut bi, mut aj) = (0usize, 0usize);
        for op in ops {
            match op {
                EditOp::Keep(i, j) => {
                    if let Some(h) = open.take() {
                        hunks.push(h);
                    }
                    bi = i + 1;
                    aj = j + 1;
                }
                EditOp::Delete(i) => {
                    let h = open.get_or_insert(Hunk {
                        b_start: bi,
                        b_end: bi,
                        a_start: aj,
                        a_end: aj,
                    });
                    h.b_end = i + 1;
                    bi = i + 1;
                }
                EditOp::Insert(j) => {
                    let h = open.get_or_insert(Hunk {
                        b_start: bi,
                        b_end: bi,
                        a_start: aj,
                        a_end: aj,
                    });
                    h.a_end = j + 1;
                    aj = j + 1;
                }
            }
        }
        if let Some(h) = open {
            hunks.push(h);
        }

        let replacements = hunks
            .iter()
            .flat_map(|h| classify_hunk(before, after, h))
            .collect();
        Comparison {
            similarity: dice_from_common(common, before.len(), after.len()),
            replacements: dedup(replacements),
        }
    }

    /// Same tokens, same calls, at least one call with permuted arguments
    fn argument_reordering(&self, before: &[Token], after: &[Token]) -> Option<Comparison> {
        if before.len() != after.len() {
            return None;
        }
        let mut sorted_b = before.to_vec();
        let mut sorted_a = after.to_vec();
        sorted_b.sort();
        sorted_a.sort();
        if sorted_b != sorted_a {
            return None;
        }

        let calls_b = call_arguments(before);
        let calls_a = call_arguments(after);
        if calls_b.len() != calls_a.len() {
            return None;
        }
        let mut replacements = Vec::new();
        for (cb, ca) in calls_b.iter().zip(calls_a.iter()) {
            if cb.name != ca.name {
                return None;
            }
            if cb.args == ca.args {
                continue;
            }
            let mut x = cb.args.clone();
            let mut y = ca.args.clone();
            x.sort();
            y.sort();
            if x == y {
                replacements.push(Replacement::new(
                    ReplacementKind::ArgumentsReordered,
                    cb.args.join(", "),
                    ca.args.join(", "),
                ));
            }
        }
        if replacements.is_empty() {
            return None;
        }
        Some(Comparison {
            similarity: 1.0 - replacements.len() as f64 / before.len() as f64,
            replacements,
        })
    }
}

/// Decision tree for one differing token pair
fn classify_pair(before: &[Token], i: usize, after: &[Token], j: usize) -> ReplacementKind {
    let bt = &before[i];
    let at = &after[j];

    let type_like = bt.is_type_like() && at.is_type_like();
    if type_like && (in_type_position(before, i) || in_type_position(after, j)) {
        return ReplacementKind::TypeChanged;
    }

    match (bt.kind, at.kind) {
        (TokenKind::Identifier, TokenKind::Identifier) => {
            if next_is(before, i, "(") && next_is(after, j, "(") {
                ReplacementKind::InvocationRenamed
            } else {
                ReplacementKind::VariableRenamed
            }
        }
        (TokenKind::StringLiteral, TokenKind::StringLiteral) => {
            ReplacementKind::StringLiteralChanged
        }
        (TokenKind::NumberLiteral, TokenKind::NumberLiteral) => {
            ReplacementKind::NumberLiteralChanged
        }
        (b, a) if b.is_literal() && a.is_literal() => ReplacementKind::LiteralChanged,
        (b, TokenKind::Identifier) if b.is_literal() => ReplacementKind::LiteralToVariable,
        (TokenKind::Identifier, a) if a.is_literal() => ReplacementKind::VariableToLiteral,
        (TokenKind::Operator, TokenKind::Operator) => ReplacementKind::OperatorChanged,
        _ => ReplacementKind::ExpressionReplaced,
    }
}

fn next_is(tokens: &[Token], i: usize, text: &str) -> bool {
    tokens.get(i + 1).map(|t| t.is(text)).unwrap_or(false)
}

fn prev_is(tokens: &[Token], i: usize, text: &str) -> bool {
    i > 0 && tokens[i - 1].is(text)
}

/// `T x`, `new T(`, `List<T>`, `instanceof T`, `T.staticCall()`
fn in_type_position(tokens: &[Token], i: usize) -> bool {
    let tok = &tokens[i];
    let next_ident = tokens
        .get(i + 1)
        .map(|t| t.kind == TokenKind::Identifier)
        .unwrap_or(false);
    let capitalized = tok
        .text
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase())
        .unwrap_or(false);
    next_ident
        || prev_is(tokens, i, "new")
        || prev_is(tokens, i, "instanceof")
        || prev_is(tokens, i, "<")
        || next_is(tokens, i, "<")
        || next_is(tokens, i, ">")
        || (capitalized && next_is(tokens, i, "."))
}

fn classify_hunk(before: &[Token], after: &[Token], h: &Hunk) -> Vec<Replacement> {
    let b = &before[h.b_start..h.b_end];
    let a = &after[h.a_start..h.a_end];

    if b.len() == 1 && a.len() == 1 {
        let kind = classify_pair(before, h.b_start, after, h.a_start);
        return vec![Replacement::new(kind, b[0].text.clone(), a[0].text.clone())];
    }

    if b.is_empty() || a.is_empty() {
        let added = b.is_empty();
        let (seq, start, end, tokens) = if added {
            (after, h.a_start, h.a_end, a)
        } else {
            (before, h.b_start, h.b_end, b)
        };
        if tokens.len() == 1 && tokens[0].is("!") {
            return vec![Replacement::new(
                ReplacementKind::ConditionInverted,
                canonical_text(b),
                canonical_text(a),
            )];
        }
        if is_argument_hunk(seq, start, end) {
            let arg: Vec<Token> = trim_commas(tokens).to_vec();
            let kind = if added {
                ReplacementKind::ArgumentAdded
            } else {
                ReplacementKind::ArgumentRemoved
            };
            let text = canonical_text(&arg);
            return if added {
                vec![Replacement::new(kind, "", text)]
            } else {
                vec![Replacement::new(kind, text, "")]
            };
        }
    }

    if b.len() == a.len() {
        let pairs: Vec<Replacement> = (0..b.len())
            .filter(|k| b[*k] != a[*k])
            .map(|k| {
                Replacement::new(
                    classify_pair(before, h.b_start + k, after, h.a_start + k),
                    b[k].text.clone(),
                    a[k].text.clone(),
                )
            })
            .collect();
        if pairs
            .iter()
            .all(|r| r.kind != ReplacementKind::ExpressionReplaced)
        {
            return pairs;
        }
    }

    vec![Replacement::new(
        ReplacementKind::ExpressionReplaced,
        canonical_text(b),
        canonical_text(a),
    )]
}

fn trim_commas(tokens: &[Token]) -> &[Token] {
    let mut slice = tokens;
    while let Some(first) = slice.first() {
        if first.is(",") {
            slice = &slice[1..];
        } else {
            break;
        }
    }
    while let Some(last) = slice.last() {
        if last.is(",") {
            slice = &slice[..slice.len() - 1];
        } else {
            break;
        }
    }
    slice
}

fn balanced(tokens: &[Token]) -> bool {
    let mut depth = 0i32;
    for t in tokens {
        if t.is("(") {
            depth += 1;
        } else if t.is(")") {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

/// Hunk that adds or removes one whole entry of an argument list
fn is_argument_hunk(seq: &[Token], start: usize, end: usize) -> bool {
    let toks = &seq[start..end];
    if toks.is_empty() || !balanced(toks) {
        return false;
    }
    let prev_open = start > 0 && (seq[start - 1].is("(") || seq[start - 1].is(","));
    let next_close = seq.get(end).map(|t| t.is(")") || t.is(",")).unwrap_or(false);
    let lead_comma = toks[0].is(",");
    let trail_comma = toks[toks.len() - 1].is(",");
    let whole_list = start > 0
        && seq[start - 1].is("(")
        && seq.get(end).map(|t| t.is(")")).unwrap_or(false);
    (lead_comma && next_close) || (trail_comma && prev_open) || whole_list
}

/// Argument texts of every call in token order
fn call_arguments(tokens: &[Token]) -> Vec<CallArguments> {
    let mut out = Vec::new();
    for k in 0..tokens.len() {
        if !(tokens[k].is_identifier() && next_is(tokens, k, "(")) {
            continue;
        }
        let mut depth = 0i32;
        let mut args = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        for t in &tokens[k + 1..] {
            if t.is("(") {
                depth += 1;
                if depth == 1 {
                    continue;
                }
            } else if t.is(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else if t.is(",") && depth == 1 {
                args.push(canonical_text(&current));
                current.clear();
                continue;
            }
            current.push(t.clone());
        }
        if !current.is_empty() {
            args.push(canonical_text(&current));
        }
        out.push(CallArguments {
            name: tokens[k].text.clone(),
            args,
        });
    }
    out
}

/// Keep the first occurrence of each replacement, preserving order
fn dedup(replacements: Vec<Replacement>) -> Vec<Replacement> {
    let mut out: Vec<Replacement> = Vec::with_capacity(replacements.len());
    for r in replacements {
        if !out.contains(&r) {
            out.push(r);
        }
    }
    out
}
