//! Daily trigger
//!
//! Sleeps until the configured local time, runs the job, and repeats until
//! stopped.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::{SchedulerError, SchedulerResult};

/// Sleep used when the next run time cannot be resolved
const FALLBACK_SLEEP: std::time::Duration = std::time::Duration::from_secs(60);

// ============================================================================
// Trigger Configuration
// ============================================================================

/// Configuration for the daily trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Daily run time in 24h format, e.g. "08:00"
    pub run_time: String,

    /// Run one cycle immediately when the loop starts
    pub run_on_startup: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            run_time: "08:00".to_string(),
            run_on_startup: false,
        }
    }
}

impl TriggerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SchedulerResult<()> {
        parse_run_time(&self.run_time).map(|_| ())
    }
}

/// Parse an `HH:MM` run time
pub fn parse_run_time(value: &str) -> SchedulerResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SchedulerError::invalid_time(value))
}

/// Next occurrence of `run_time` strictly after `now`
///
/// In a DST gap the earliest valid instant after the gap is used.
pub fn next_run_after<Tz: TimeZone>(
    now: &DateTime<Tz>,
    run_time: NaiveTime,
) -> SchedulerResult<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();

    for offset in 0..=2 {
        let date = today + Duration::days(offset);
        let naive = date.and_time(run_time);
        let candidate = tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest());

        if let Some(candidate) = candidate {
            if candidate > *now {
                return Ok(candidate);
            }
        }
    }

    Err(SchedulerError::UnresolvableLocalTime {
        value: format!("{} {}", today, run_time.format("%H:%M")),
    })
}

// ============================================================================
// Daily Trigger
// ============================================================================

/// Runs a job once a day at a fixed local time
pub struct DailyTrigger {
    config: TriggerConfig,
    run_time: NaiveTime,
    is_running: Arc<RwLock<bool>>,
}

impl DailyTrigger {
    /// Create a new trigger
    pub fn new(config: TriggerConfig) -> SchedulerResult<Self> {
        let run_time = parse_run_time(&config.run_time)?;
        Ok(Self {
            config,
            run_time,
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Create a trigger for `HH:MM`
    pub fn at(run_time: &str) -> SchedulerResult<Self> {
        Self::new(TriggerConfig {
            run_time: run_time.to_string(),
            ..Default::default()
        })
    }

    /// Set whether a cycle runs at startup
    pub fn run_on_startup(mut self, value: bool) -> Self {
        self.config.run_on_startup = value;
        self
    }

    pub fn run_time(&self) -> NaiveTime {
        self.run_time
    }

    /// Duration until the next local run
    pub fn duration_until_next_run(&self) -> SchedulerResult<Duration> {
        let now = Local::now();
        let next = next_run_after(&now, self.run_time)?;
        Ok(next.signed_duration_since(now))
    }

    /// Run `job` at every scheduled time until [`stop`](Self::stop) is called
    pub async fn start<F, Fut>(&self, job: F) -> SchedulerResult<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()>,
    {
        {
            let mut running = self.is_running.write().await;
            if *running {
                return Err(SchedulerError::AlreadyRunning);
            }
            *running = true;
        }

        tracing::info!(run_time = %self.run_time.format("%H:%M"), "Daily trigger started");

        if self.config.run_on_startup {
            job().await;
        }

        while *self.is_running.read().await {
            let sleep_duration = match self.duration_until_next_run() {
                Ok(d) => d.to_std().unwrap_or(FALLBACK_SLEEP),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "Cannot resolve next run, retrying later");
                    FALLBACK_SLEEP
                }
                Err(e) => {
                    *self.is_running.write().await = false;
                    return Err(e);
                }
            };

            tracing::debug!(secs = sleep_duration.as_secs(), "Sleeping until next run");

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    job().await;
                }
                _ = self.wait_for_stop() => {
                    break;
                }
            }
        }

        tracing::info!("Daily trigger stopped");
        Ok(())
    }

    /// Stop the trigger loop
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Check if trigger is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    // Internal: Wait for stop signal
    async fn wait_for_stop(&self) {
        loop {
            if !*self.is_running.read().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
