use anyhow::Context;

use bookshelf_app::modules;
use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db_host = %settings.database.host,
        db_name = %settings.database.name,
        "bookshelf-app bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, pool.clone());

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };

    registry.init_modules(&ctx).await?;

    // Migration failure is fatal; the process exits non-zero
    bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to run migrations")?;

    registry.start_modules(&ctx).await?;

    bookshelf_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await?;
    pool.close().await;

    tracing::info!("bookshelf-app shutdown complete");
    Ok(())
}
