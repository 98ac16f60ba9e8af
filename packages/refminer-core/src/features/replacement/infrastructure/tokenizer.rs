//! Regex tokenizer producing canonical statement text
//!
//! Canonical text is the token sequence joined by single spaces, so two
//! statements that differ only in whitespace or formatting compare equal.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
          (?P<str>"(?:\\.|[^"\\])*")
        | (?P<chr>'(?:\\.|[^'\\])*')
        | (?P<num>\d[\w.]*)
        | (?P<ident>[A-Za-z_$][A-Za-z0-9_$]*)
        | (?P<op>>>>=|<<=|>>=|>>>|->|::|\+\+|--|&&|\|\||==|!=|<=|>=|\+=|-=|\*=|/=|%=|&=|\|=|\^=|<<|>>|[-+*/%=<>!~?:&|^@])
        | (?P<punct>[(){}\[\];,.])
        "#,
    )
    .expect("token pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Identifier,
    Keyword,
    StringLiteral,
    CharLiteral,
    NumberLiteral,
    BooleanLiteral,
    NullLiteral,
    Operator,
    Punctuation,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::NumberLiteral
                | TokenKind::BooleanLiteral
                | TokenKind::NullLiteral
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Identifier or primitive type keyword
    pub fn is_type_like(&self) -> bool {
        self.kind == TokenKind::Identifier || is_primitive_type(&self.text)
    }
}

pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "if"
            | "implements"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "new"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "try"
            | "var"
            | "void"
            | "while"
    )
}

pub fn is_primitive_type(s: &str) -> bool {
    matches!(
        s,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void" | "var"
    )
}

/// Split source text into tokens; characters no pattern accepts are dropped
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for caps in TOKEN_PATTERN.captures_iter(text) {
        let token = if let Some(m) = caps.name("str") {
            Token::new(TokenKind::StringLiteral, m.as_str())
        } else if let Some(m) = caps.name("chr") {
            Token::new(TokenKind::CharLiteral, m.as_str())
        } else if let Some(m) = caps.name("num") {
            Token::new(TokenKind::NumberLiteral, m.as_str())
        } else if let Some(m) = caps.name("ident") {
            let s = m.as_str();
            let kind = match s {
                "true" | "false" => TokenKind::BooleanLiteral,
                "null" => TokenKind::NullLiteral,
                _ if is_keyword(s) => TokenKind::Keyword,
                _ => TokenKind::Identifier,
            };
            Token::new(kind, s)
        } else if let Some(m) = caps.name("op") {
            Token::new(TokenKind::Operator, m.as_str())
        } else if let Some(m) = caps.name("punct") {
            Token::new(TokenKind::Punctuation, m.as_str())
        } else {
            continue;
        };
        tokens.push(token);
    }
    tokens
}

pub fn canonical_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace identifier tokens by the tokens of their mapped text
///
/// Member selections (`obj.x`) and invoked names (`x(...)`) are left alone.
pub fn substitute(tokens: &[Token], map: &FxHashMap<String, Vec<Token>>) -> Vec<Token> {
    if map.is_empty() {
        return tokens.to_vec();
    }
    let mut out = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.iter().enumerate() {
        let after_dot = i > 0 && tokens[i - 1].is(".");
        let before_call = tokens.get(i + 1).map(|t| t.is("(")).unwrap_or(false);
        match map.get(&tok.text) {
            Some(replacement) if tok.is_identifier() && !after_dot && !before_call => {
                out.extend(replacement.iter().cloned())
            }
            _ => out.push(tok.clone()),
        }
    }
    out
}
