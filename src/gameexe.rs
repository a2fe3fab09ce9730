//! `Gameexe` configuration parser and dotted-key query view (spec.md §4.9,
//! §6).
//!
//! Lines beginning `#` are entries; `=` separates the key from a
//! comma-separated token list; each token is an integer (leading zeros
//! permitted) or a double-quoted string. Compact entries whose value
//! contains embedded dashes (e.g. a `lo-hi-id` triple) are kept as a
//! single string token rather than split on `-`; only a top-level comma
//! starts a new token. A line with more than one `=` after the key
//! (observed in `#KEY=00000000-99999999-00269364="A"="B"`-style entries)
//! keeps everything after the first `=` as one value list rather than
//! splitting into further keys — the original format's multi-assignment
//! lines aren't otherwise documented anywhere in the retrieved source.

use std::collections::HashMap;

/// One parsed value token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i32),
    Str(String),
}

impl Token {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Token::Int(v) => Some(*v),
            Token::Str(s) => s.parse().ok(),
        }
    }

    pub fn as_string_owned(&self) -> Option<String> {
        match self {
            Token::Str(s) => Some(s.clone()),
            Token::Int(v) => Some(v.to_string()),
        }
    }

    /// `Some` only for genuinely quoted/string tokens, not numeric ones.
    pub fn as_string_token(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s),
            Token::Int(_) => None,
        }
    }
}

fn split_top_level(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in value.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_token(raw: &str) -> Token {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Token::Str(raw[1..raw.len() - 1].to_string());
    }
    match raw.parse::<i32>() {
        Ok(n) => Token::Int(n),
        Err(_) => Token::Str(raw.to_string()),
    }
}

/// Parses one `#KEY=tok,tok,...` line. Returns `None` for blank lines,
/// comments without a leading `#`, or lines with no `=`.
pub fn parse_line(line: &str) -> Option<(String, Vec<Token>)> {
    let line = line.trim();
    let body = line.strip_prefix('#')?;
    let eq = body.find('=')?;
    let key = body[..eq].trim().to_string();
    if key.is_empty() {
        return None;
    }
    let value = &body[eq + 1..];
    let tokens = split_top_level(value).iter().map(|s| parse_token(s)).collect();
    Some((key, tokens))
}

/// A dotted-key multimap of game configuration entries.
#[derive(Debug, Clone, Default)]
pub struct Gameexe {
    entries: HashMap<String, Vec<Token>>,
}

impl Gameexe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `#`-led line in `content`, later duplicate keys
    /// overwriting earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            if let Some((key, tokens)) = parse_line(line) {
                entries.insert(key, tokens);
            }
        }
        Self { entries }
    }

    /// Query view over `key` (already dotted, e.g. `"FOLDNAME.001"`).
    pub fn ini<'a>(&'a self, key: &str) -> Query<'a> {
        Query { tokens: self.entries.get(key) }
    }

    /// Iterates every entry whose key equals `prefix` or starts with
    /// `prefix.`.
    pub fn prefix_iter<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Vec<Token>)> {
        self.entries.iter().filter_map(move |(k, v)| {
            if k == prefix || k.starts_with(&format!("{prefix}.")) {
                Some((k.as_str(), v))
            } else {
                None
            }
        })
    }
}

/// A read-only view over one key's token list.
pub struct Query<'a> {
    tokens: Option<&'a Vec<Token>>,
}

impl Query<'_> {
    pub fn as_int(&self) -> Option<i32> {
        self.tokens?.first()?.as_int()
    }

    pub fn as_string(&self) -> Option<String> {
        self.tokens?.first()?.as_string_owned()
    }

    pub fn as_int_vector(&self) -> Vec<i32> {
        self.tokens.map(|t| t.iter().filter_map(Token::as_int).collect()).unwrap_or_default()
    }

    pub fn int_at(&self, i: usize) -> Option<i32> {
        self.tokens?.get(i)?.as_int()
    }

    pub fn string_at(&self, i: usize) -> Option<String> {
        self.tokens?.get(i)?.as_string_owned()
    }
}
