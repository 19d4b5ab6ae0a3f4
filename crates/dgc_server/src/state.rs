use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use dgc_core::db::{close_db, DbResult};
use log::warn;
use rusqlite::Connection;
use tokio::task;

use super::{config::Config, error::ApiError};

/// Shared handler state; owns the single store connection.
pub struct AppState {
    pub config: Config,
    db: Mutex<Option<Connection>>,
}

impl AppState {
    pub fn new(config: Config, conn: Connection) -> Arc<Self> {
        Arc::new(Self {
            config,
            db: Mutex::new(Some(conn)),
        })
    }

    /// Calendar date the rotation runs against.
    pub fn today(&self) -> NaiveDate {
        self.config
            .fixed_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Takes the connection out of the state and closes it. Later store
    /// access fails with an internal error.
    pub fn close(&self) -> DbResult<()> {
        let conn = match self.db.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match conn {
            Some(conn) => close_db(conn),
            None => {
                warn!("event=db_close module=server status=skipped reason=already_closed");
                Ok(())
            }
        }
    }
}

/// Runs `work` against the store connection on the blocking pool.
pub async fn with_db<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    task::spawn_blocking(move || {
        let guard = state
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| ApiError::Internal("database is closed".to_string()))?;
        work(conn)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}
