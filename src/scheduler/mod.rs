//! Pipeline scheduling
//!
//! # Overview
//!
//! A [`DailyTrigger`] sleeps until the configured local time and then runs
//! [`PipelineScheduler::run_cycle`]. The same method is the manual "run now"
//! entry point, so scheduled and on-demand cycles share one code path.
//!
//! # Modules
//!
//! - [`cycle`] - One fetch, summarize, translate, save, convert pass
//! - [`trigger`] - Daily wake-up loop with a stop flag
//! - [`error`] - Scheduler error types
//!
//! # Quick Start
//!
//! ```ignore
//! use newsbridge::scheduler::{DailyTrigger, PipelineScheduler};
//!
//! let trigger = DailyTrigger::at("08:00")?;
//! trigger
//!     .start(|| async {
//!         if let Err(e) = scheduler.run_cycle().await {
//!             tracing::error!(error = %e, "Cycle failed");
//!         }
//!     })
//!     .await?;
//! ```

pub mod cycle;
pub mod error;
pub mod trigger;

pub use cycle::{ItemOutcome, PipelineScheduler, DEFAULT_CONVERSION_LIMIT};
pub use error::{SchedulerError, SchedulerResult};
pub use trigger::{next_run_after, parse_run_time, DailyTrigger, TriggerConfig};
