//! Conditional-compilation block stripping.
//!
//! Sources mark optional code with label blocks:
//!
//! ```text
//! {@dev console.log(x); }@dev
//!
//! {@assert
//!     check(x);
//! }@assert
//! ```
//!
//! Stripping a label replaces every well-formed block for that label with a
//! single space, so tokens on either side never fuse. Markers are plain text:
//! an opener without a closer (or the reverse) is left in place and can be
//! listed with [`Preprocessor::find_malformed`].

use std::fmt;

use regex::Regex;

use crate::core::error::{MinifyError, Result};

/// Compiled block patterns for one label.
#[derive(Debug, Clone)]
struct LabelRule {
    label: String,
    /// `{@label ... }@label` on one line
    inline: Regex,
    /// `{@label<rest of line>\n ... }@label`
    block: Regex,
    opener: Regex,
    closer: Regex,
}

impl LabelRule {
    fn new(label: &str) -> Result<Self> {
        check_label(label)?;

        let name = regex::escape(label);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                MinifyError::invalid(format!("bad pattern for label `{}`: {}", label, e))
            })
        };

        Ok(LabelRule {
            label: label.to_string(),
            inline: compile(format!(r"\{{@{name}\b[^\n]*?\}}@{name}\b"))?,
            block: compile(format!(r"\{{@{name}\b[^\n]*\n[\s\S]*?\}}@{name}\b"))?,
            opener: compile(format!(r"\{{@{name}\b"))?,
            closer: compile(format!(r"\}}@{name}\b"))?,
        })
    }

    fn strip(&self, text: &str) -> String {
        let text = self.inline.replace_all(text, " ");
        self.block.replace_all(&text, " ").into_owned()
    }
}

/// Which half of a block was left without its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `{@label` with no matching `}@label` after it
    UnterminatedOpen,
    /// `}@label` with no matching `{@label` before it
    UnmatchedClose,
}

/// A marker that survived stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedBlock {
    pub label: String,
    /// 1-based line in the newline-normalized text
    pub line: usize,
    pub kind: MarkerKind,
}

impl fmt::Display for MalformedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MarkerKind::UnterminatedOpen => write!(
                f,
                "line {}: `{{@{}` has no closing `}}@{}`",
                self.line, self.label, self.label
            ),
            MarkerKind::UnmatchedClose => write!(
                f,
                "line {}: `}}@{}` has no opening `{{@{}`",
                self.line, self.label, self.label
            ),
        }
    }
}

/// Strips label blocks for a fixed set of labels.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    rules: Vec<LabelRule>,
}

impl Preprocessor {
    /// Compile the patterns for `labels`.
    ///
    /// Fails with [`MinifyError::InvalidConfiguration`] if a label contains
    /// anything other than word characters.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let rules = labels
            .iter()
            .map(|label| LabelRule::new(label.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Preprocessor { rules })
    }

    /// Normalize line endings, then strip every well-formed block.
    pub fn process(&self, text: &str) -> String {
        let text = normalize_newlines(text);
        self.rules
            .iter()
            .fold(text, |text, rule| rule.strip(&text))
    }

    /// Strip blocks like [`process`](Self::process) and list the markers
    /// left behind.
    pub fn process_with_report(&self, text: &str) -> (String, Vec<MalformedBlock>) {
        let processed = self.process(text);
        let found = self.leftover_markers(&processed);
        (processed, found)
    }

    /// List markers that [`process`](Self::process) leaves behind.
    ///
    /// The text itself is never modified by this check.
    pub fn find_malformed(&self, text: &str) -> Vec<MalformedBlock> {
        self.process_with_report(text).1
    }

    fn leftover_markers(&self, processed: &str) -> Vec<MalformedBlock> {
        let mut found = Vec::new();

        for rule in &self.rules {
            for m in rule.opener.find_iter(processed) {
                found.push(MalformedBlock {
                    label: rule.label.clone(),
                    line: line_of(processed, m.start()),
                    kind: MarkerKind::UnterminatedOpen,
                });
            }
            for m in rule.closer.find_iter(processed) {
                found.push(MalformedBlock {
                    label: rule.label.clone(),
                    line: line_of(processed, m.start()),
                    kind: MarkerKind::UnmatchedClose,
                });
            }
        }

        found.sort_by_key(|b| b.line);
        found
    }
}

/// Reject labels that are not made of word characters.
pub(crate) fn check_label(label: &str) -> Result<()> {
    if label.is_empty() || !label.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(MinifyError::invalid(format!(
            "label `{}` must be made of word characters only",
            label
        )));
    }
    Ok(())
}

/// Strip the blocks for `labels` from `text`.
pub fn process<S: AsRef<str>>(text: &str, labels: &[S]) -> Result<String> {
    Ok(Preprocessor::new(labels)?.process(text))
}

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
