//! # Tab Completion
//!
//! rustyline helper completing the word under the cursor. The first word of
//! a line completes against the shell's command keywords, every later word
//! against a fixed list of SQL keywords. An all upper-case prefix gets
//! upper-case candidates.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

const SQL_KEYWORDS: &[&str] = &[
    "table", "index", "from", "into", "where", "values", "and", "or",
    "set", "with", "by", "using", "like",
    "boolean", "integer", "string", "float", "double", "short", "long",
    "byte", "timestamp", "ip", "object", "dynamic", "strict", "ignored",
    "array", "blob", "primary key",
    "analyzer", "extends", "tokenizer", "char_filters", "token_filters",
    "number_of_replicas", "clustered",
    "refresh", "alter",
];

pub struct KeywordCompletion {
    commands: Vec<&'static str>,
}

impl KeywordCompletion {
    pub fn new(commands: Vec<&'static str>) -> Self {
        Self { commands }
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let line = &line[..pos];
        let start = line
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line[start..];
        if prefix.is_empty() {
            return (start, vec![]);
        }

        let first_word = line[..start].trim().is_empty();
        let words: &[&str] = if first_word { &self.commands } else { SQL_KEYWORDS };

        let lowered = prefix.to_lowercase();
        let upper = prefix.chars().all(|c| !c.is_lowercase()) && prefix.chars().any(char::is_uppercase);
        let matches = words
            .iter()
            .filter(|w| w.starts_with(&lowered))
            .map(|w| if upper { w.to_uppercase() } else { w.to_string() })
            .collect();

        (start, matches)
    }
}

impl Helper for KeywordCompletion {}

impl Completer for KeywordCompletion {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(line, pos);
        let pairs = matches
            .into_iter()
            .map(|m| Pair {
                display: m.clone(),
                replacement: m,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for KeywordCompletion {
    type Hint = String;
}

impl Highlighter for KeywordCompletion {}

impl Validator for KeywordCompletion {}
