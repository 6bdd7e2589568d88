//! Config - 통합 설정 관리
//!
//! - `settings.rs` - RunnerSettings 통합 설정

mod settings;

pub use settings::{
    ActionFailurePolicy, RunnerSettings, SimulationSettings, DEFAULT_REPEAT_COUNT, SETTINGS_FILE,
};
