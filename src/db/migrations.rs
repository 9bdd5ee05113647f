use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema scripts in order; entry `n` upgrades `user_version` n to n+1.
const MIGRATIONS: &[(&str, &str)] = &[(
    "schema_v1.sql",
    include_str!("schemas/schema_v1.sql"),
)];

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let latest = MIGRATIONS.len() as i32;
    let applied: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if applied > latest {
        bail!("conversation store schema v{applied} is newer than this build (v{latest})");
    }
    if applied == latest {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    for (name, script) in MIGRATIONS.iter().skip(applied as usize) {
        tx.execute_batch(script)
            .with_context(|| format!("failed to execute {name}"))?;
    }

    tx.pragma_update(None, "user_version", latest)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    log::info!("conversation store migrated from v{applied} to v{latest}");
    Ok(())
}
