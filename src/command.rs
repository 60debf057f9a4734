//! The "copy snippet" command as seen by an editor host.
//!
//! The host only has to hand over its selections and answer settings lookups;
//! putting the result on a clipboard stays on the host's side.

use crate::comments::{language_from_syntax, resolve_comment_template};
use crate::error::SnippetError;
use crate::indent::{FormattingContext, IndentChar};
use crate::snippet::extract_snippet;

pub const TRANSLATE_TABS_KEY: &str = "translate_tabs_to_spaces";
pub const TAB_SIZE_KEY: &str = "tab_size";
pub const SYNTAX_KEY: &str = "syntax";

/// Tab width assumed when the host has no `tab_size` setting.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// A value returned from a host settings lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// What the command needs from an editor.
pub trait SnippetHost {
    /// Text of every selected region, in selection order.
    fn selections(&self) -> Vec<String>;

    /// Look up an editor setting; `None` when it is not set.
    fn settings_get(&self, key: &str) -> Option<SettingValue>;
}

#[derive(Debug)]
pub struct CopySnippetCommand<H> {
    host: H,
}

impl<H: SnippetHost> CopySnippetCommand<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The command only makes sense with at least one selection.
    pub fn is_enabled(&self) -> bool {
        !self.host.selections().is_empty()
    }

    /// Read the formatting context out of the host settings.
    pub fn formatting_context(&self) -> Result<FormattingContext, SnippetError> {
        let translate_tabs = match self.host.settings_get(TRANSLATE_TABS_KEY) {
            None => false,
            Some(SettingValue::Bool(b)) => b,
            Some(other) => return Err(invalid(TRANSLATE_TABS_KEY, "expected a boolean", other)),
        };

        let tab_size = match self.host.settings_get(TAB_SIZE_KEY) {
            None => DEFAULT_TAB_SIZE,
            Some(SettingValue::Int(n)) => usize::try_from(n).map_err(|_| {
                invalid(TAB_SIZE_KEY, "expected a positive integer", SettingValue::Int(n))
            })?,
            Some(other) => return Err(invalid(TAB_SIZE_KEY, "expected an integer", other)),
        };

        let syntax = match self.host.settings_get(SYNTAX_KEY) {
            None => None,
            Some(SettingValue::Str(s)) => Some(s),
            Some(other) => return Err(invalid(SYNTAX_KEY, "expected a string", other)),
        };

        FormattingContext::new(
            IndentChar::from_translate_tabs(translate_tabs),
            tab_size,
            language_from_syntax(syntax.as_deref()),
        )
    }

    /// Build the snippet for the current selections.
    pub fn run(&self) -> Result<String, SnippetError> {
        let ctx = self.formatting_context()?;
        let template = resolve_comment_template(&ctx.language);

        extract_snippet(&self.host.selections(), ctx.indent, ctx.tab_size, template)
    }
}

fn invalid(key: &str, expected: &str, got: SettingValue) -> SnippetError {
    SnippetError::InvalidSetting {
        key: key.to_string(),
        reason: format!("{expected}, got {got:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct FakeHost {
        selections: Vec<String>,
        settings: HashMap<String, SettingValue>,
    }

    impl FakeHost {
        fn with_selections(selections: &[&str]) -> Self {
            let mut host = FakeHost {
                selections: selections.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            };
            host.settings
                .insert(TAB_SIZE_KEY.to_string(), SettingValue::Int(4));
            host
        }

        fn set(mut self, key: &str, value: SettingValue) -> Self {
            self.settings.insert(key.to_string(), value);
            self
        }
    }

    impl SnippetHost for FakeHost {
        fn selections(&self) -> Vec<String> {
            self.selections.clone()
        }

        fn settings_get(&self, key: &str) -> Option<SettingValue> {
            self.settings.get(key).cloned()
        }
    }

    #[test]
    fn disabled_without_selections() {
        let command = CopySnippetCommand::new(FakeHost::with_selections(&[]));
        assert!(!command.is_enabled());
        assert_eq!(command.run().unwrap(), "");
    }

    #[test]
    fn enabled_with_one_or_more_selections() {
        assert!(CopySnippetCommand::new(FakeHost::with_selections(&["{ }"])).is_enabled());
        assert!(CopySnippetCommand::new(FakeHost::with_selections(&["{ }", "[]"])).is_enabled());
    }

    #[test]
    fn run_defaults_to_tabs_and_hash_comments() {
        let host = FakeHost::with_selections(&[
            "function () {\n\tdoSomething();\n}",
            "\tfunction () {\n    \tdoSomething();\n    }",
        ]);
        let out = CopySnippetCommand::new(host).run().unwrap();
        assert_eq!(
            out,
            "function () {\n\tdoSomething();\n}\n\n# code omitted\n\n\tfunction () {\n\t\tdoSomething();\n\t}"
        );
    }

    #[test]
    fn run_uses_spaces_and_syntax_comment_style() {
        let host = FakeHost::with_selections(&["\tSELECT 1", "\t\tSELECT 2"])
            .set(TRANSLATE_TABS_KEY, SettingValue::Bool(true))
            .set(TAB_SIZE_KEY, SettingValue::Int(2))
            .set(
                SYNTAX_KEY,
                SettingValue::Str("Packages/SQL/SQL.tmLanguage".to_string()),
            );
        let command = CopySnippetCommand::new(host);

        let ctx = command.formatting_context().unwrap();
        assert_eq!(ctx.indent, IndentChar::Space);
        assert_eq!(ctx.language, "sql");

        assert_eq!(command.run().unwrap(), "SELECT 1\n\n-- code omitted\n\n  SELECT 2");
    }

    #[test]
    fn missing_tab_size_falls_back_to_default() {
        let mut host = FakeHost::with_selections(&["\tx"])
            .set(TRANSLATE_TABS_KEY, SettingValue::Bool(true));
        host.settings.remove(TAB_SIZE_KEY);

        let command = CopySnippetCommand::new(host);
        assert_eq!(command.formatting_context().unwrap().tab_size, DEFAULT_TAB_SIZE);
    }

    #[test]
    fn bad_tab_size_is_reported() {
        let zero = FakeHost::with_selections(&["x"]).set(TAB_SIZE_KEY, SettingValue::Int(0));
        assert_eq!(
            CopySnippetCommand::new(zero).run(),
            Err(SnippetError::InvalidTabSize(0))
        );

        let negative =
            FakeHost::with_selections(&["x"]).set(TAB_SIZE_KEY, SettingValue::Int(-2));
        assert!(matches!(
            CopySnippetCommand::new(negative).run(),
            Err(SnippetError::InvalidSetting { key, .. }) if key == TAB_SIZE_KEY
        ));
    }

    #[test]
    fn wrongly_typed_setting_is_reported() {
        let host = FakeHost::with_selections(&["x"])
            .set(TRANSLATE_TABS_KEY, SettingValue::Str("yes".to_string()));
        let err = CopySnippetCommand::new(host).run().unwrap_err();
        assert!(err.to_string().contains(TRANSLATE_TABS_KEY));
    }
}
