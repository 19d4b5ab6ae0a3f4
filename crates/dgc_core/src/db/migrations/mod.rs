//! Ordered schema scripts, tracked through `PRAGMA user_version`.
//!
//! Versions are contiguous from 1. Pending scripts run inside one transaction
//! together with the version bump, so a failed upgrade leaves the file as it
//! was.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// `(version, name, script)`, oldest first.
const SCHEMA: [(u32, &str, &str); 2] = [
    (1, "manuals", include_str!("0001_manuals.sql")),
    (2, "notes", include_str!("0002_notes.sql")),
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA.len() as u32
}

/// Brings the store up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = latest_version();

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = SCHEMA.iter().filter(|(version, _, _)| *version > found);
    let tx = conn.transaction()?;
    let mut applied = 0;
    for &(version, name, script) in pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version,
                name,
                source,
            })?;
        debug!("event=db_migrate_step module=db status=ok version={version} name={name}");
        applied += 1;
    }
    tx.commit()?;

    if applied > 0 {
        info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    }
    Ok(())
}
