mod model;
mod server;

use crate::server::{
    config::Config, error::AppError, router, scheduler::backup_retention, startup,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;

    startup::prepare_directories(&config).await?;
    let db = startup::connect_to_database(&config).await?;

    tracing::info!("Starting server");

    // Start backup retention scheduler
    let scheduler_backups_dir = config.backups_dir.clone();
    let retention = config.retention();
    tokio::spawn(async move {
        if let Err(e) = backup_retention::start_scheduler(scheduler_backups_dir, retention).await
        {
            tracing::error!("Backup retention scheduler error: {}", e);
        }
    });

    let app = router::router(AppState::new(db, config.backup_settings()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
