//! Interpretation of trimmed command output.
//!
//! Each action declares a [`ResultShape`]; [`ResultShape::normalize`] turns the
//! executor's trimmed stdout into the matching [`ActionOutput`].
//!
//! Boolean shapes follow a fixed contract: only the exact text `true` means
//! `true`. Empty output, `false`, or any diagnostic chatter from the tool all
//! mean `false`, and none of them are errors.

use serde::{Deserialize, Serialize};

/// Separator used by list-shaped results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Newline,
    Comma,
}

impl Delimiter {
    fn as_char(&self) -> char {
        match self {
            Delimiter::Newline => '\n',
            Delimiter::Comma => ',',
        }
    }
}

/// How an action's output is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "delimiter", rename_all = "lowercase")]
pub enum ResultShape {
    /// Raw text, passed through unmodified.
    Text,
    /// `true` exactly, or `false` for anything else.
    Boolean,
    /// A sequence split on the delimiter.
    List(Delimiter),
}

/// A normalized action result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutput {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl ActionOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ActionOutput::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ActionOutput::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ActionOutput::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text form of any output. Lists are joined with newlines.
    pub fn into_text(self) -> String {
        match self {
            ActionOutput::Text(s) => s,
            ActionOutput::Bool(b) => b.to_string(),
            ActionOutput::List(items) => items.join("\n"),
        }
    }

    /// Boolean form of any output, using the exact-`true` rule for text.
    pub fn into_bool(self) -> bool {
        match self {
            ActionOutput::Bool(b) => b,
            ActionOutput::Text(s) => parse_bool(&s),
            ActionOutput::List(_) => false,
        }
    }

    /// List form of any output. Text becomes a one-element list unless empty.
    pub fn into_list(self) -> Vec<String> {
        match self {
            ActionOutput::List(items) => items,
            ActionOutput::Text(s) if s.is_empty() => Vec::new(),
            ActionOutput::Text(s) => vec![s],
            ActionOutput::Bool(b) => vec![b.to_string()],
        }
    }
}

impl ResultShape {
    /// Applies this shape to already-trimmed command output.
    pub fn normalize(&self, text: &str) -> ActionOutput {
        match self {
            ResultShape::Text => ActionOutput::Text(text.to_string()),
            ResultShape::Boolean => ActionOutput::Bool(parse_bool(text)),
            ResultShape::List(delimiter) => ActionOutput::List(split_list(text, *delimiter)),
        }
    }
}

/// `true` only for the exact token `true`.
pub fn parse_bool(text: &str) -> bool {
    text == "true"
}

/// Splits `text` on `delimiter`, trimming entries and dropping empty ones.
pub fn split_list(text: &str, delimiter: Delimiter) -> Vec<String> {
    text.split(delimiter.as_char())
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
