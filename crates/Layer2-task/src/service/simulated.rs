//! Simulated content service
//!
//! Stands in for a real catalog: every keyword discovers the same fixed
//! targets, submits succeed unless a failure rate is configured, and
//! comment sections contain synthesized user handles.

use async_trait::async_trait;
use rand::Rng;
use remark_foundation::{ContentActionService, ServiceError, SimulationSettings, Target};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Number of synthesized commenters per target
const COMMENTERS_PER_TARGET: usize = 5;

/// In-process placeholder service
pub struct SimulatedContentService {
    targets: Vec<Target>,
    latency: Duration,
    failure_rate: f64,
    submitted: AtomicUsize,
}

impl SimulatedContentService {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets,
            latency: Duration::ZERO,
            failure_rate: 0.0,
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self::new(settings.targets().into_iter().map(Target::from).collect())
            .with_latency(settings.latency())
            .with_failure_rate(settings.failure_rate())
    }

    /// Delay applied to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fraction of submits that fail, clamped to 0.0..=1.0
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Successful submits so far
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for SimulatedContentService {
    fn default() -> Self {
        Self::from_settings(&SimulationSettings::default())
    }
}

#[async_trait]
impl ContentActionService for SimulatedContentService {
    async fn discover(&self, keyword: &str) -> Result<Vec<Target>, ServiceError> {
        self.delay().await;
        debug!(keyword, found = self.targets.len(), "Simulated discovery");
        Ok(self.targets.clone())
    }

    async fn submit(&self, target: &Target, text: &str) -> Result<(), ServiceError> {
        self.delay().await;

        let rejected = self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate);
        if rejected {
            debug!(%target, "Simulated submit rejected");
            return Err(ServiceError::failed(format!("simulated rejection on {}", target)));
        }

        self.submitted.fetch_add(1, Ordering::SeqCst);
        debug!(%target, text, "Simulated submit");
        Ok(())
    }

    async fn commenters(&self, target: &Target, limit: usize) -> Result<Vec<String>, ServiceError> {
        self.delay().await;
        Ok((1..=COMMENTERS_PER_TARGET.min(limit))
            .map(|i| format!("{}-user{}", target, i))
            .collect())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
