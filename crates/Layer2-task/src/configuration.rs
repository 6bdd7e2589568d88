//! Task configuration and its validation gate
//!
//! A [`TaskConfiguration`] can only be obtained through
//! [`TaskConfiguration::build`], so holding one proves the keyword and comment
//! are non-blank and the repeat count is positive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw, unvalidated task parameters as supplied by a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub keyword: String,
    pub comment_text: String,
    pub repeat_count: i64,
}

impl TaskInput {
    pub fn new(keyword: impl Into<String>, comment_text: impl Into<String>, repeat_count: i64) -> Self {
        Self {
            keyword: keyword.into(),
            comment_text: comment_text.into(),
            repeat_count,
        }
    }

    /// Validate into a [`TaskConfiguration`]
    pub fn validate(&self) -> Result<TaskConfiguration, ConfigurationError> {
        TaskConfiguration::build(&self.keyword, &self.comment_text, self.repeat_count)
    }
}

/// Why raw input was rejected. Reports the first violation in field order.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationError {
    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("comment text must not be empty")]
    EmptyComment,

    #[error("repeat count must be positive, got {0}")]
    NonPositiveRepeatCount(i64),

    #[error("repeat count {0} is out of range")]
    RepeatCountTooLarge(i64),
}

impl From<ConfigurationError> for remark_foundation::Error {
    fn from(e: ConfigurationError) -> Self {
        remark_foundation::Error::InvalidInput(e.to_string())
    }
}

/// Validated, immutable task parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfiguration {
    keyword: String,
    comment_text: String,
    repeat_count: u32,
}

impl TaskConfiguration {
    /// Build a configuration, trimming surrounding whitespace from both strings.
    ///
    /// Repeat counts above `u32::MAX` are rejected as out of range rather than
    /// silently truncated.
    pub fn build(
        keyword: &str,
        comment_text: &str,
        repeat_count: i64,
    ) -> Result<Self, ConfigurationError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ConfigurationError::EmptyKeyword);
        }

        let comment_text = comment_text.trim();
        if comment_text.is_empty() {
            return Err(ConfigurationError::EmptyComment);
        }

        if repeat_count <= 0 {
            return Err(ConfigurationError::NonPositiveRepeatCount(repeat_count));
        }
        let repeat_count = u32::try_from(repeat_count)
            .map_err(|_| ConfigurationError::RepeatCountTooLarge(repeat_count))?;

        Ok(Self {
            keyword: keyword.to_string(),
            comment_text: comment_text.to_string(),
            repeat_count,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn comment_text(&self) -> &str {
        &self.comment_text
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }
}
