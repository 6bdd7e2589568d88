//! Core Traits - 외부 콘텐츠 서비스 인터페이스
//!
//! Layer2 태스크 러너는 이 trait만 통해 외부 카탈로그와 통신합니다.
//! 연결/세션의 수명은 호스트(Layer3)가 소유합니다.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer3-CLI (host)                                          │
//! │  └── ContentActionService 구현 선택 + 수명 관리              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer2-Task                                                │
//! │  └── TaskRunner: discover → submit × repeat                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer1-Foundation (이 레이어)                              │
//! │  └── ContentActionService trait, Target, ServiceError       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use super::types::{ServiceError, Target};
use async_trait::async_trait;

/// External catalog that can be searched and commented on.
///
/// Implementations own any rate limiting or admission control; callers
/// never retry.
#[async_trait]
pub trait ContentActionService: Send + Sync {
    /// Resolve a keyword into an ordered sequence of targets (possibly empty)
    async fn discover(&self, keyword: &str) -> Result<Vec<Target>, ServiceError>;

    /// Submit one comment against a target
    async fn submit(&self, target: &Target, text: &str) -> Result<(), ServiceError>;

    /// User handles seen in a target's comment section, at most `limit`.
    ///
    /// Services without comment-section access return an empty list.
    async fn commenters(&self, _target: &Target, _limit: usize) -> Result<Vec<String>, ServiceError> {
        Ok(Vec::new())
    }

    /// Service name for logs
    fn name(&self) -> &'static str;
}
