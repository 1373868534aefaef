use anyhow::{Context, Result};
use std::sync::Arc;

use newsbridge::config::Config;
use newsbridge::models::CycleReport;
use newsbridge::scheduler::{DailyTrigger, TriggerConfig};

use super::App;

/// Run one cycle now
pub async fn run(config: Config) -> Result<()> {
    println!("Running news pipeline");
    println!("=====================");

    let app = App::open(config)?.with_llm()?;
    let scheduler = app.scheduler()?;

    let report = scheduler.run_cycle().await.context("Pipeline cycle failed")?;
    print_report(&report);

    Ok(())
}

/// Run cycles daily until Ctrl-C
pub async fn schedule(config: Config, run_now: bool) -> Result<()> {
    let app = App::open(config)?.with_llm()?;
    let scheduler = app.scheduler()?;

    let trigger = Arc::new(
        DailyTrigger::new(TriggerConfig {
            run_time: app.config.pipeline.schedule_time.clone(),
            run_on_startup: run_now,
        })
        .context("Invalid schedule time")?,
    );

    println!(
        "Scheduling daily pipeline at {} (local time)",
        trigger.run_time().format("%H:%M")
    );
    if let Ok(until) = trigger.duration_until_next_run() {
        println!(
            "  Next run in {}h {}m",
            until.num_hours(),
            until.num_minutes() % 60
        );
    }
    println!("  Press Ctrl-C to stop");

    let stopper = trigger.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            stopper.stop().await;
        }
    });

    let scheduler = &scheduler;
    trigger
        .start(move || async move {
            match scheduler.run_cycle().await {
                Ok(report) => print_report(&report),
                Err(e) => tracing::error!(error = %e, "Scheduled cycle failed"),
            }
        })
        .await?;

    Ok(())
}

fn print_report(report: &CycleReport) {
    println!();
    println!("Cycle Summary");
    println!("{:-<40}", "");
    println!("  Processed: {}", report.processed);
    println!("  Saved:     {}", report.success);
    println!("  Skipped:   {}", report.skipped);
    println!("  Errors:    {}", report.error);
}
