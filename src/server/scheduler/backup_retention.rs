use std::{path::PathBuf, time::Duration};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{error::AppError, service::backup::retention::prune_backups};

/// Starts the backup retention scheduler
///
/// This scheduler runs at the top of every hour and deletes backup archives of every
/// tenant that are older than `max_age`.
///
/// # Arguments
/// - `backups_dir`: Root of per-tenant backup directories
/// - `max_age`: Age after which an archive is removed
pub async fn start_scheduler(backups_dir: PathBuf, max_age: Duration) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let backups_dir = backups_dir.clone();

        Box::pin(async move {
            match prune_backups(&backups_dir, max_age).await {
                Ok(0) => tracing::debug!("No expired backups to prune"),
                Ok(removed) => tracing::info!("Pruned {} expired backup(s)", removed),
                Err(e) => tracing::error!("Error pruning expired backups: {}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(
        "Backup retention scheduler started, keeping archives for {} day(s)",
        max_age.as_secs() / 86_400
    );

    Ok(())
}
