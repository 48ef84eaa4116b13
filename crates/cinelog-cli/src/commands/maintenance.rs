use super::ui;
use super::AppContext;
use crate::output::Output;
use crate::MaintenanceCommands;
use cinelog_config::MaintenanceConfig;
use cinelog_core::{repair_missing_runtimes, run_maintenance as run_passes, MaintenanceOutcome, Repository};
use cinelog_tmdb::TmdbClient;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

pub async fn run_maintenance(cmd: MaintenanceCommands, output: &Output) -> Result<()> {
    match cmd {
        MaintenanceCommands::FixRuntimes => fix_runtimes(output),
        MaintenanceCommands::Daemon {
            schedule,
            no_startup_run,
        } => {
            let ctx = AppContext::local()?;
            let mut config = ctx.config.maintenance.clone();
            if let Some(schedule) = schedule {
                config.schedule = schedule;
            }
            if no_startup_run {
                config.run_on_startup = false;
            }

            output.info(format!(
                "Maintenance daemon running on '{}'. Logs: {}",
                config.schedule,
                ctx.paths.daemon_log_file().display()
            ));
            let mut scheduler = Scheduler::new(Arc::new(ctx.repo), config).await?;
            scheduler.start().await
        }
    }
}

fn fix_runtimes(output: &Output) -> Result<()> {
    let ctx = AppContext::local()?;
    let report = repair_missing_runtimes(&ctx.repo).map_err(|e| eyre!("Runtime repair failed: {}", e))?;
    output.data(&report);

    if output.is_human() {
        let mut table = ui::table(&["Runtime repair", ""]);
        table.add_row(vec![Cell::new("Shows checked"), Cell::new(report.checked)]);
        table.add_row(vec![Cell::new("Fixed"), Cell::new(report.fixed)]);
        table.add_row(vec![Cell::new("Skipped (no episode count)"), Cell::new(report.skipped)]);
        println!("{}", table);
    }
    if report.fixed > 0 {
        output.success(format!("Repaired {} runtime(s)", report.fixed));
    } else {
        output.info("No runtimes needed repair.");
    }
    Ok(())
}

/// Run the maintenance passes off the async runtime and log the outcome.
async fn run_once(repo: Arc<Repository<TmdbClient>>, trigger: &'static str) {
    info!(operation = "maintenance_start", trigger, "Starting maintenance run");

    let outcome = tokio::task::spawn_blocking(move || run_passes(repo.as_ref()))
        .await
        .unwrap_or_else(|e| MaintenanceOutcome::Retry(format!("maintenance task panicked: {}", e)));

    match outcome {
        MaintenanceOutcome::Success(report) => info!(
            operation = "maintenance_complete",
            trigger,
            checked = report.checked,
            fixed = report.fixed,
            skipped = report.skipped,
            "Maintenance run completed"
        ),
        MaintenanceOutcome::Retry(reason) => warn!(
            operation = "maintenance_retry",
            trigger,
            reason = %reason,
            "Maintenance run failed; retrying at the next scheduled tick"
        ),
    }
}

pub struct Scheduler {
    scheduler: JobScheduler,
    repo: Arc<Repository<TmdbClient>>,
    config: MaintenanceConfig,
}

impl Scheduler {
    pub async fn new(repo: Arc<Repository<TmdbClient>>, config: MaintenanceConfig) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| eyre!("Failed to create scheduler: {}", e))?;

        Ok(Self {
            scheduler,
            repo,
            config,
        })
    }

    /// Runs until interrupted with Ctrl-C.
    pub async fn start(&mut self) -> Result<()> {
        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running maintenance on startup");
            run_once(self.repo.clone(), "startup").await;
        }

        let repo = self.repo.clone();
        let job = Job::new_async(self.config.schedule.as_str(), move |_uuid, _lock| {
            let repo = repo.clone();
            Box::pin(async move {
                run_once(repo, "schedule").await;
            })
        })
        .map_err(|e| eyre!("Invalid maintenance schedule '{}': {}", self.config.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| eyre!("Failed to schedule maintenance job: {}", e))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| eyre!("Failed to start scheduler: {}", e))?;

        info!(
            operation = "scheduler_started",
            schedule = %self.config.schedule,
            "Scheduler started"
        );

        tokio::signal::ctrl_c().await?;
        info!(operation = "scheduler_shutdown", "Shutting down");
        if let Err(e) = self.scheduler.shutdown().await {
            error!(operation = "scheduler_shutdown", error = %e, "Scheduler did not shut down cleanly");
        }
        Ok(())
    }
}
