//! Runner Settings - 태스크 러너 통합 설정
//!
//! 글로벌(<config_dir>/remark/settings.json)과 프로젝트(.remark/settings.json)
//! 설정을 병합합니다. 프로젝트 설정이 우선합니다.

use crate::storage::{JsonStore, SettingsScope};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// 설정 파일명
pub const SETTINGS_FILE: &str = "settings.json";

/// Repeat count used when the host does not supply one
pub const DEFAULT_REPEAT_COUNT: u32 = 1;

const DEFAULT_SIMULATED_TARGETS: [&str; 3] = ["video1", "video2", "video3"];

// ============================================================================
// Action Failure Policy
// ============================================================================

/// How the action phase reacts to a failed submit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFailurePolicy {
    /// Count the failure and keep going
    #[default]
    Continue,
    /// Stop the action phase at the first failure
    Abort,
}

impl FromStr for ActionFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            other => Err(Error::Config(format!(
                "unknown failure policy '{}' (expected continue or abort)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ActionFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => f.write_str("continue"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

// ============================================================================
// Runner Settings
// ============================================================================

/// Remark 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<ActionFailurePolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repeat_count: Option<u32>,

    /// 시뮬레이션 서비스 설정
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl RunnerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let global = JsonStore::for_scope(SettingsScope::Global).ok();
        let project = JsonStore::for_scope(SettingsScope::Project).ok();
        Self::load_from(global.as_ref(), project.as_ref())
    }

    /// Merge settings from explicit stores, later stores winning
    pub fn load_from(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let mut settings = Self::new();

        for store in [global, project].into_iter().flatten() {
            if let Some(loaded) = store.read::<RunnerSettings>(SETTINGS_FILE)? {
                tracing::debug!(path = %store.file_path(SETTINGS_FILE).display(), "Loaded settings");
                settings.merge(loaded);
            }
        }

        Ok(settings)
    }

    /// 한 범위의 설정만 로드 (병합 없음)
    pub fn load_scope(scope: SettingsScope) -> Result<Self> {
        let store = JsonStore::for_scope(scope)?;
        Self::load_from(Some(&store), None)
    }

    /// 범위별 설정 저장
    pub fn save(&self, scope: SettingsScope) -> Result<PathBuf> {
        self.save_to(&JsonStore::for_scope(scope)?)
    }

    pub fn save_to(&self, store: &JsonStore) -> Result<PathBuf> {
        store.write(SETTINGS_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: RunnerSettings) {
        if other.failure_policy.is_some() {
            self.failure_policy = other.failure_policy;
        }
        if other.default_repeat_count.is_some() {
            self.default_repeat_count = other.default_repeat_count;
        }
        self.simulation.merge(other.simulation);
    }

    // ========================================================================
    // Effective values
    // ========================================================================

    pub fn failure_policy(&self) -> ActionFailurePolicy {
        self.failure_policy.unwrap_or_default()
    }

    pub fn default_repeat_count(&self) -> u32 {
        self.default_repeat_count.unwrap_or(DEFAULT_REPEAT_COUNT)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_failure_policy(mut self, policy: ActionFailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn with_default_repeat_count(mut self, count: u32) -> Self {
        self.default_repeat_count = Some(count);
        self
    }
}

// ============================================================================
// Simulation Settings
// ============================================================================

/// 시뮬레이션 콘텐츠 서비스 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    /// Targets every discovery returns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,

    /// Artificial delay per service call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// Fraction of submits that fail, 0.0..=1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_rate: Option<f64>,
}

impl SimulationSettings {
    pub fn merge(&mut self, other: SimulationSettings) {
        if other.targets.is_some() {
            self.targets = other.targets;
        }
        if other.latency_ms.is_some() {
            self.latency_ms = other.latency_ms;
        }
        if other.failure_rate.is_some() {
            self.failure_rate = other.failure_rate;
        }
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.clone().unwrap_or_else(|| {
            DEFAULT_SIMULATED_TARGETS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn latency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.latency_ms.unwrap_or(0))
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate.unwrap_or(0.0).clamp(0.0, 1.0)
    }
}
