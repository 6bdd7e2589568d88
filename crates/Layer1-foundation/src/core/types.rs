//! Core Types - 콘텐츠 서비스와 주고받는 데이터 타입

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Target
// ============================================================================

/// Opaque handle to a content item returned by discovery.
///
/// The runner never inspects the handle; it only passes it back to
/// [`ContentActionService::submit`](super::ContentActionService::submit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// ServiceError
// ============================================================================

/// Failure reported by a content service call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// This call failed; later calls may still succeed
    #[error("request failed: {0}")]
    Failed(String),

    /// The service can no longer be reached at all
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Whether the whole collaborator is gone, not just this call
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
