//! PostgreSQL connection bootstrap and schema migration runner.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    id TEXT PRIMARY KEY,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// Establish a connection pool against the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .connect(&settings.url())
        .await
        .with_context(|| {
            format!(
                "failed to connect to postgres at {}:{}/{}",
                settings.host, settings.port, settings.name
            )
        })?;

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "database pool established"
    );

    Ok(pool)
}

/// Apply pending migrations in order.
///
/// Applied migration ids are recorded in a `_migrations` ledger table so the
/// runner is idempotent across restarts. Each migration executes inside its
/// own transaction together with its ledger entry.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    sqlx::raw_sql(LEDGER_DDL)
        .execute(pool)
        .await
        .context("failed to create migrations ledger table")?;

    for (module, migration) in migrations {
        let key = format!("{}/{}", module, migration.id);

        let mut tx = pool
            .begin()
            .await
            .context("failed to begin migration transaction")?;

        let applied: Option<String> =
            sqlx::query_scalar("SELECT id FROM _migrations WHERE id = $1")
                .bind(&key)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("failed to check migration '{}'", key))?;

        if applied.is_some() {
            tracing::debug!(migration = %key, "migration already applied, skipping");
            continue;
        }

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to apply migration '{}'", key))?;

        sqlx::query("INSERT INTO _migrations (id) VALUES ($1)")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration '{}'", key))?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration '{}'", key))?;

        tracing::info!(migration = %key, "applied migration");
    }

    Ok(())
}
