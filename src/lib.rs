use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

pub mod command;
pub mod comments;
pub mod error;
pub mod indent;
pub mod snippet;

pub use crate::command::{CopySnippetCommand, SettingValue, SnippetHost};
pub use crate::comments::{format_comment, resolve_comment_template};
pub use crate::error::SnippetError;
pub use crate::indent::{FormattingContext, IndentChar, normalize_indent};
pub use crate::snippet::extract_snippet;

use crate::command::{SYNTAX_KEY, TAB_SIZE_KEY, TRANSLATE_TABS_KEY};
use crate::comments::language_for_extension;

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct Config {
    pub selections: Vec<SelectionSpec>,
    pub spaces: bool,
    pub tab_size: usize,
    pub syntax: Option<String>,
    pub language: Option<String>,
    pub json: bool,
}

/// Where a region's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

/// One region to copy: a source plus an optional 1-based, inclusive line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSpec {
    pub source: Source,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl FromStr for SelectionSpec {
    type Err = String;

    /// Accepts `-`, `PATH`, `PATH:LINE`, `PATH:START-END` and `PATH:START-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("selection must not be empty".to_string());
        }
        if s == "-" {
            return Ok(SelectionSpec {
                source: Source::Stdin,
                start: None,
                end: None,
            });
        }

        // A suffix that doesn't look like a range is part of the path (e.g. `C:\src`).
        if let Some((path, range)) = s.rsplit_once(':')
            && !path.is_empty()
            && let Some((start, end)) = parse_line_range(range)?
        {
            return Ok(SelectionSpec {
                source: Source::File(PathBuf::from(path)),
                start: Some(start),
                end,
            });
        }

        Ok(SelectionSpec {
            source: Source::File(PathBuf::from(s)),
            start: None,
            end: None,
        })
    }
}

impl fmt::Display for SelectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Stdin => f.write_str("<stdin>")?,
            Source::File(path) => write!(f, "{}", normalize_for_display(path))?,
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) if start == end => write!(f, ":{start}"),
            (Some(start), Some(end)) => write!(f, ":{start}-{end}"),
            (Some(start), None) => write!(f, ":{start}-"),
            _ => Ok(()),
        }
    }
}

/// `Ok(None)` when `range` is not a line range at all.
fn parse_line_range(range: &str) -> Result<Option<(usize, Option<usize>)>, String> {
    if range.is_empty() || !range.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Ok(None);
    }

    let (start, end) = match range.split_once('-') {
        None => (range, Some(range)),
        Some((start, "")) => (start, None),
        Some((start, end)) => (start, Some(end)),
    };

    let start: usize = start
        .parse()
        .map_err(|_| format!("invalid start line in `{range}`"))?;
    let end: Option<usize> = end
        .map(|e| e.parse().map_err(|_| format!("invalid end line in `{range}`")))
        .transpose()?;

    if start == 0 {
        return Err(format!("line numbers start at 1 (got `{range}`)"));
    }
    if let Some(end) = end
        && end < start
    {
        return Err(format!("line range `{range}` ends before it starts"));
    }

    Ok(Some((start, end)))
}

/// Output of `--json`.
#[derive(serde::Serialize)]
struct SnippetOutput<'a> {
    language: &'a str,
    comment_template: &'a str,
    indent: IndentChar,
    tab_size: usize,
    regions: usize,
    snippet: &'a str,
}

/// Selections loaded from disk/stdin, standing in for an editor.
#[derive(Debug, Default)]
pub struct LoadedSelections {
    regions: Vec<String>,
    settings: HashMap<String, SettingValue>,
}

impl LoadedSelections {
    pub fn new(regions: Vec<String>) -> Self {
        Self {
            regions,
            settings: HashMap::new(),
        }
    }

    pub fn with_setting(mut self, key: &str, value: SettingValue) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }
}

impl SnippetHost for LoadedSelections {
    fn selections(&self) -> Vec<String> {
        self.regions.clone()
    }

    fn settings_get(&self, key: &str) -> Option<SettingValue> {
        self.settings.get(key).cloned()
    }
}

pub fn run_with_config(cfg: Config) -> Result<()> {
    let mut had_error = false;
    let mut stdin_text: Option<String> = None;
    let mut regions = Vec::with_capacity(cfg.selections.len());

    for spec in &cfg.selections {
        let text = match &spec.source {
            Source::Stdin => {
                if stdin_text.is_none() {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    stdin_text = Some(buf);
                }
                stdin_text.clone().unwrap_or_default()
            }
            Source::File(path) => match read_file(path) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("Error reading {}: {:#}", spec, err);
                    had_error = true;
                    continue;
                }
            },
        };

        match select_lines(&text, spec.start, spec.end) {
            Ok(region) => {
                debug!(selection = %spec, bytes = region.len(), "loaded selection");
                regions.push(region);
            }
            Err(err) => {
                eprintln!("Skipping {}: {:#}", spec, err);
                had_error = true;
            }
        }
    }

    if had_error {
        bail!("One or more selections could not be read. See stderr for details.");
    }

    let mut host = LoadedSelections::new(regions)
        .with_setting(TRANSLATE_TABS_KEY, SettingValue::Bool(cfg.spaces))
        .with_setting(
            TAB_SIZE_KEY,
            SettingValue::Int(i64::try_from(cfg.tab_size).context("Tab size is too large")?),
        );
    if let Some(syntax) = syntax_setting(&cfg) {
        host = host.with_setting(SYNTAX_KEY, SettingValue::Str(syntax));
    }

    let command = CopySnippetCommand::new(host);
    if !command.is_enabled() {
        bail!("Nothing selected.");
    }

    let ctx = command
        .formatting_context()
        .context("Invalid formatting settings")?;
    let template = resolve_comment_template(&ctx.language);
    info!(
        language = %ctx.language,
        indent = %ctx.indent,
        tab_size = ctx.tab_size,
        template,
        "resolved formatting context"
    );

    let snippet = command.run().context("Failed to build snippet")?;

    let mut stdout = io::stdout().lock();
    if cfg.json {
        let output = SnippetOutput {
            language: &ctx.language,
            comment_template: template,
            indent: ctx.indent,
            tab_size: ctx.tab_size,
            regions: command.host().regions.len(),
            snippet: &snippet,
        };
        let json = serde_json::to_string(&output)?;
        writeln!(stdout, "{json}")?;
    } else {
        write!(stdout, "{snippet}")?;
    }
    stdout.flush()?;

    Ok(())
}

/// Value for the host `syntax` setting: an explicit language wins, then a
/// syntax file, then whatever the first input file's extension suggests.
fn syntax_setting(cfg: &Config) -> Option<String> {
    if let Some(language) = &cfg.language {
        return Some(language.clone());
    }
    if let Some(syntax) = &cfg.syntax {
        return Some(syntax.clone());
    }

    cfg.selections
        .iter()
        .find_map(|spec| match &spec.source {
            Source::File(path) => path.extension().and_then(|e| e.to_str()),
            Source::Stdin => None,
        })
        .and_then(language_for_extension)
        .map(str::to_string)
}

fn read_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {}", normalize_for_display(path)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Cut lines `start..=end` (1-based) out of `text`.
///
/// Without a range the whole text is the region, minus its final line break so
/// joined regions don't pick up stray blank lines.
pub fn select_lines(text: &str, start: Option<usize>, end: Option<usize>) -> Result<String> {
    let Some(start) = start else {
        let text = text.strip_suffix('\n').unwrap_or(text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        return Ok(text.to_string());
    };

    let lines: Vec<&str> = text.lines().collect();
    let last = end.unwrap_or(lines.len());

    if start > lines.len() || last > lines.len() {
        bail!(
            "line range {}-{} is outside the input ({} lines)",
            start,
            last,
            lines.len()
        );
    }

    Ok(lines[start - 1..last].join("\n"))
}

/// Convert paths to a stable, slash-separated form for messages.
fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, start: Option<usize>, end: Option<usize>) -> SelectionSpec {
        SelectionSpec {
            source: Source::File(PathBuf::from(path)),
            start,
            end,
        }
    }

    #[test]
    fn parses_selection_specs() {
        assert_eq!("-".parse::<SelectionSpec>().unwrap().source, Source::Stdin);
        assert_eq!(
            "src/a.py".parse::<SelectionSpec>().unwrap(),
            file("src/a.py", None, None)
        );
        assert_eq!(
            "src/a.py:3".parse::<SelectionSpec>().unwrap(),
            file("src/a.py", Some(3), Some(3))
        );
        assert_eq!(
            "src/a.py:3-7".parse::<SelectionSpec>().unwrap(),
            file("src/a.py", Some(3), Some(7))
        );
        assert_eq!(
            "src/a.py:3-".parse::<SelectionSpec>().unwrap(),
            file("src/a.py", Some(3), None)
        );
    }

    #[test]
    fn non_range_suffix_stays_in_path() {
        assert_eq!(
            r"C:\code\a.c".parse::<SelectionSpec>().unwrap(),
            file(r"C:\code\a.c", None, None)
        );
        assert_eq!(
            "notes:draft.txt".parse::<SelectionSpec>().unwrap(),
            file("notes:draft.txt", None, None)
        );
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!("a.py:0".parse::<SelectionSpec>().is_err());
        assert!("a.py:5-2".parse::<SelectionSpec>().is_err());
        assert!("a.py:1-2-3".parse::<SelectionSpec>().is_err());
        assert!("".parse::<SelectionSpec>().is_err());
    }

    #[test]
    fn display_round_trips_ranges() {
        assert_eq!(file("a.py", Some(2), Some(4)).to_string(), "a.py:2-4");
        assert_eq!(file("a.py", Some(2), Some(2)).to_string(), "a.py:2");
        assert_eq!(file("a.py", Some(2), None).to_string(), "a.py:2-");
    }

    #[test]
    fn select_lines_cuts_inclusive_ranges() {
        let text = "one\ntwo\nthree\nfour\n";
        assert_eq!(select_lines(text, Some(2), Some(3)).unwrap(), "two\nthree");
        assert_eq!(select_lines(text, Some(4), None).unwrap(), "four");
        assert_eq!(select_lines(text, None, None).unwrap(), "one\ntwo\nthree\nfour");
        assert!(select_lines(text, Some(3), Some(9)).is_err());
        assert!(select_lines(text, Some(5), None).is_err());
    }

    #[test]
    fn syntax_setting_prefers_explicit_language() {
        let mut cfg = Config {
            selections: vec![file("query.sql", None, None)],
            spaces: false,
            tab_size: 4,
            syntax: Some("Packages/Lua/Lua.tmLanguage".to_string()),
            language: Some("haskell".to_string()),
            json: false,
        };
        assert_eq!(syntax_setting(&cfg).as_deref(), Some("haskell"));

        cfg.language = None;
        assert_eq!(
            syntax_setting(&cfg).as_deref(),
            Some("Packages/Lua/Lua.tmLanguage")
        );

        cfg.syntax = None;
        assert_eq!(syntax_setting(&cfg).as_deref(), Some("sql"));

        cfg.selections = vec![file("notes.txt", None, None)];
        assert_eq!(syntax_setting(&cfg), None);
    }
}
