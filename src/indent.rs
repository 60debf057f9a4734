use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::SnippetError;

// Leading tab/space run of a line, plus the first non-whitespace char after it.
// Blank and whitespace-only lines never match.
static LEADING_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([\t ]*)(\S)").expect("leading run pattern is valid"));

/// The character indentation is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentChar {
    Tab,
    Space,
}

impl IndentChar {
    /// `true` for editors configured to translate tabs to spaces.
    pub fn from_translate_tabs(translate_tabs_to_spaces: bool) -> Self {
        if translate_tabs_to_spaces {
            IndentChar::Space
        } else {
            IndentChar::Tab
        }
    }

    pub fn as_char(self) -> char {
        match self {
            IndentChar::Tab => '\t',
            IndentChar::Space => ' ',
        }
    }
}

impl fmt::Display for IndentChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentChar::Tab => f.write_str("tab"),
            IndentChar::Space => f.write_str("space"),
        }
    }
}

/// Everything the core needs to know about how the source buffer is indented.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FormattingContext {
    pub indent: IndentChar,
    pub tab_size: usize,
    pub language: String,
}

impl FormattingContext {
    pub fn new(
        indent: IndentChar,
        tab_size: usize,
        language: impl Into<String>,
    ) -> Result<Self, SnippetError> {
        check_tab_size(tab_size)?;
        Ok(Self {
            indent,
            tab_size,
            language: language.into(),
        })
    }
}

pub(crate) fn check_tab_size(tab_size: usize) -> Result<(), SnippetError> {
    if tab_size == 0 {
        return Err(SnippetError::InvalidTabSize(tab_size));
    }
    Ok(())
}

/// Every leading run in `text` that is followed by non-whitespace, in order.
pub(crate) fn leading_runs(text: &str) -> impl Iterator<Item = &str> {
    LEADING_RUN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Rewrite each matched leading run with `f`, leaving everything else as-is.
pub(crate) fn rewrite_leading_runs<'t, F>(text: &'t str, mut f: F) -> Cow<'t, str>
where
    F: FnMut(&str) -> String,
{
    LEADING_RUN_RE.replace_all(text, |caps: &Captures<'_>| {
        let mut out = f(&caps[1]);
        out.push_str(&caps[2]);
        out
    })
}

/// Convert the leading whitespace of every non-blank line to `indent`.
///
/// Converting to spaces expands each tab in the run to `tab_size` spaces.
/// Converting to tabs collapses each complete group of `tab_size` spaces into
/// one tab; leftover spaces stay where they are, so mixed indentation does not
/// always round-trip.
pub fn normalize_indent(
    text: &str,
    indent: IndentChar,
    tab_size: usize,
) -> Result<String, SnippetError> {
    check_tab_size(tab_size)?;

    let spaces = " ".repeat(tab_size);
    let normalized = rewrite_leading_runs(text, |run| match indent {
        IndentChar::Space => run.replace('\t', &spaces),
        IndentChar::Tab => run.replace(spaces.as_str(), "\t"),
    });

    Ok(normalized.into_owned())
}
