//! Core Module - 핵심 인터페이스 및 타입
//!
//! - `types.rs`: 데이터 타입 (Target, ServiceError)
//! - `traits.rs`: 인터페이스 (ContentActionService)

pub mod traits;
pub mod types;

pub use traits::ContentActionService;
pub use types::{ServiceError, Target};
