//! Token-schema statements.
//!
//! Every built-in command describes its statement as a schema string with
//! `:Token` placeholders, e.g. `SELECT :Projections FROM :Target :Where`.
//! Refinements accumulate values per token; rendering substitutes each
//! token's formatted values and drops the words left empty by tokens
//! without values.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Pattern for `:Token` placeholders in a schema
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":([A-Z][A-Za-z]*)").unwrap());

/// How a token's accumulated values become statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    /// `a, b`
    List,
    /// `a b`
    Spaced,
    /// `KEYWORD a, b`, nothing when empty
    Clause(&'static str),
    /// `a` alone, `[a, b]` for several
    Target,
    /// `[a, b]`, nothing when empty
    Bracketed,
    /// `a.` so it can prefix a following token
    Qualifier,
}

impl TokenFormat {
    fn apply(self, values: &[String]) -> String {
        if values.is_empty() {
            return String::new();
        }

        match self {
            TokenFormat::List => values.join(", "),
            TokenFormat::Spaced => values.join(" "),
            TokenFormat::Clause(keyword) => format!("{} {}", keyword, values.join(", ")),
            TokenFormat::Target if values.len() == 1 => values[0].clone(),
            TokenFormat::Target | TokenFormat::Bracketed => format!("[{}]", values.join(", ")),
            TokenFormat::Qualifier => format!("{}.", values.join(".")),
        }
    }
}

/// A token and its raw (unformatted) values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
struct Slot {
    name: &'static str,
    format: TokenFormat,
    values: Vec<String>,
}

/// Accumulated clause state of one command
#[derive(Debug, Clone)]
pub struct Statement {
    schema: &'static str,
    slots: Vec<Slot>,
}

impl Statement {
    /// Parse the tokens out of `schema`; every token starts as a [`TokenFormat::List`].
    pub fn new(schema: &'static str) -> Self {
        let slots = TOKEN_RE
            .captures_iter(schema)
            .filter_map(|caps| caps.get(1))
            .map(|m| Slot {
                name: &schema[m.start()..m.end()],
                format: TokenFormat::List,
                values: Vec::new(),
            })
            .collect();

        Self { schema, slots }
    }

    /// Override the format of a token
    pub fn with_format(mut self, name: &str, format: TokenFormat) -> Self {
        if let Some(slot) = self.slot_mut(name) {
            slot.format = format;
        }
        self
    }

    pub fn schema(&self) -> &'static str {
        self.schema
    }

    /// Store values for a token.
    ///
    /// Without `append` previous values are discarded. With `first` the new
    /// values go in front of the existing ones.
    pub fn set<I, S>(&mut self, name: &str, values: I, append: bool, first: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(slot) = self.slot_mut(name) else {
            tracing::warn!(token = name, schema = self.schema, "token is not part of the schema");
            return;
        };

        if !append {
            slot.values.clear();
        }

        let incoming: Vec<String> = values.into_iter().map(Into::into).collect();
        if first {
            slot.values.splice(0..0, incoming);
        } else {
            slot.values.extend(incoming);
        }
    }

    /// Replace a token with a single value
    pub fn set_one(&mut self, name: &str, value: impl Into<String>) {
        let value: String = value.into();
        self.set(name, [value], false, false);
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(slot) = self.slot_mut(name) {
            slot.values.clear();
        }
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.as_slice())
            .unwrap_or_default()
    }

    /// Tokens in schema order with their raw values
    pub fn tokens(&self) -> Vec<Token> {
        self.slots
            .iter()
            .map(|s| Token {
                name: s.name.to_string(),
                values: s.values.clone(),
            })
            .collect()
    }

    /// Render the statement text.
    ///
    /// The schema is rendered word by word; words that come out empty are
    /// dropped, so token values are never rewritten.
    pub fn render(&self) -> String {
        let words: Vec<String> = self
            .schema
            .split_whitespace()
            .map(|word| self.render_word(word))
            .filter(|word| !word.is_empty())
            .collect();
        words.join(" ")
    }

    fn render_word(&self, word: &str) -> String {
        TOKEN_RE
            .replace_all(word, |caps: &Captures<'_>| {
                self.slots
                    .iter()
                    .find(|s| s.name == &caps[1])
                    .map(|s| s.format.apply(&s.values))
                    .unwrap_or_default()
            })
            .into_owned()
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }
}
