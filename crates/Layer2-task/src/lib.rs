//! # remark-task
//!
//! Task lifecycle and execution for Remark.
//! Turns a keyword, a comment and a repeat count into a background task that
//! discovers targets through a `ContentActionService` and submits the comment
//! against each one.
//!
//! ## Features
//!
//! - Validated, immutable task configuration
//! - Runner state machine (Idle → Configured → Discovering → Acting → Completed)
//! - Background execution with cancellation and a single terminal outcome
//! - Multi-task supervision for hosts
//! - Audience collection from comment sections
//! - Simulated content service

pub mod audience;
pub mod configuration;
pub mod manager;
pub mod observer;
pub mod outcome;
pub mod runner;
pub mod service;
pub mod state;
pub mod task;

// Task system
pub use configuration::{ConfigurationError, TaskConfiguration, TaskInput};
pub use manager::{TaskManager, TaskManagerConfig, TaskStatus};
pub use observer::TaskObserver;
pub use outcome::{ActionCounts, FailureReason, OutcomeState, TaskOutcome};
pub use runner::{TaskHandle, TaskRunner};
pub use state::{RunnerState, TaskProgress};
pub use task::TaskId;

// Audience
pub use audience::{collect_audience, AudienceReport};

// Services
pub use service::SimulatedContentService;
