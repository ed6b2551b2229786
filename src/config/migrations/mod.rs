//! Embedded migrations for the configuration database

use anyhow::{Context, Result};
use log::{debug, info};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub down_sql: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub checksum: String,
}

pub fn load_migrations() -> BTreeMap<i64, Migration> {
    let mut migrations = BTreeMap::new();

    migrations.insert(
        1,
        Migration {
            version: 1,
            name: "initial".to_string(),
            up_sql: include_str!("files/001_initial/up.sql").to_string(),
            down_sql: include_str!("files/001_initial/down.sql").to_string(),
        },
    );

    migrations
}

pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")
}

pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Refuse to run against a database whose applied migrations were edited afterwards
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations();

    for applied in get_applied_migrations(pool).await? {
        let Some(migration) = available.get(&applied.version) else {
            anyhow::bail!(
                "Applied migration {} '{}' is unknown to this build",
                applied.version,
                applied.name
            );
        };
        let expected = calculate_checksum(&migration.up_sql);
        if applied.checksum != expected {
            anyhow::bail!(
                "Migration {} checksum mismatch (applied {}, expected {})",
                applied.version,
                applied.checksum,
                expected
            );
        }
    }

    Ok(())
}

/// Apply every pending migration in version order, each in its own transaction
pub async fn migrate_up(pool: &SqlitePool) -> Result<usize> {
    init_migration_table(pool).await?;
    validate_migrations(pool).await?;

    let applied: HashSet<i64> = get_applied_migrations(pool)
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    let mut count = 0;
    for (version, migration) in load_migrations() {
        if applied.contains(&version) {
            continue;
        }

        debug!("Applying migration {} '{}'", version, migration.name);
        let mut tx = pool.begin().await.context("Failed to start migration transaction")?;

        sqlx::raw_sql(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to apply migration {}", version))?;

        sqlx::query("INSERT INTO schema_migrations (version, name, checksum) VALUES (?, ?, ?)")
            .bind(version)
            .bind(&migration.name)
            .bind(calculate_checksum(&migration.up_sql))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to record migration {}", version))?;

        tx.commit().await.context("Failed to commit migration")?;
        info!("Applied migration {} '{}'", version, migration.name);
        count += 1;
    }

    Ok(count)
}
