use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Location<'a> {
    File(&'a Path),
    Memory,
}

impl Display for Location<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "file path={}", path.display()),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Opens (creating when missing) the store file at `path` and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_at(Location::File(path.as_ref()))
}

/// Opens a private in-memory store, used by tests and dry runs.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_at(Location::Memory)
}

/// Closes `conn`, surfacing errors SQLite reports while finalizing.
pub fn close_db(conn: Connection) -> DbResult<()> {
    conn.close().map_err(|(_, err)| {
        error!("event=db_close module=db status=error error={err}");
        err
    })?;
    info!("event=db_close module=db status=ok");
    Ok(())
}

fn open_at(location: Location<'_>) -> DbResult<Connection> {
    let started_at = Instant::now();

    let opened = match location {
        Location::File(path) => Connection::open(path),
        Location::Memory => Connection::open_in_memory(),
    };
    let result = opened.map_err(DbError::from).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });

    let elapsed = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=db_open module=db status=ok mode={location} duration_ms={elapsed}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={location} duration_ms={elapsed} error={err}"
        ),
    }
    result
}
