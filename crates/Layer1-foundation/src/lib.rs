//! # remark-foundation
//!
//! Foundation layer for Remark:
//! - Core: 외부 콘텐츠 서비스 인터페이스 (ContentActionService, Target)
//! - Config: 통합 설정 (RunnerSettings, ActionFailurePolicy)
//! - Storage: JsonStore (글로벌/프로젝트 설정 파일)
//! - Error: 공통 에러 타입

pub mod config;
pub mod core;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (핵심 Trait 및 타입)
// ============================================================================
pub use core::{ContentActionService, ServiceError, Target};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ActionFailurePolicy, RunnerSettings, SimulationSettings, DEFAULT_REPEAT_COUNT, SETTINGS_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, SettingsScope};
