//! Editor settings, loadable from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, node::{parser::is_balanced, tree::PLACEHOLDERS}};

/// The content a newly inserted limit starts out with.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitDefaults {
    pub subscript: String,
    pub expression: String,
}

impl Default for LimitDefaults {
    fn default() -> Self {
        Self {
            subscript: "x \\to -\\infty".into(),
            expression: "\\frac{x}{2x-3}".into(),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// How long the document must be left alone before edits are pushed to the host.
    pub debounce_ms: u64,

    /// Typing this character inserts a fraction, or a limit if the text before the caret ends in
    /// `lim`.
    pub trigger: char,

    /// The caret anchor placed inside a fresh continuation.
    pub placeholder: char,

    pub limit: LimitDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            trigger: '/',
            placeholder: '\u{00A0}',
            limit: LimitDefaults::default(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates a configuration. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if !PLACEHOLDERS.contains(&self.placeholder) {
            return Err(ConfigError::UnknownPlaceholder(self.placeholder));
        }
        if self.trigger.is_whitespace() || self.trigger.is_control() {
            return Err(ConfigError::InvalidTrigger(self.trigger));
        }
        let defaults = [
            ("subscript", &self.limit.subscript),
            ("expression", &self.limit.expression),
        ];
        for (name, value) in defaults {
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::EmptyLimitDefault(name));
            }
            // A line break would end the limit's expression early
            let multiline = name == "expression" && value.contains(&['\n', '\r'][..]);
            if !is_balanced(value) || multiline {
                return Err(ConfigError::MalformedLimitDefault(name));
            }
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
