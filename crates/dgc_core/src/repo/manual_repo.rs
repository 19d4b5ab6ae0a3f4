//! Manual repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the content-store operations the manuals API needs: insert,
//!   ordered month listing with limit, lookup, update, delete, bulk clear,
//!   count.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Month listings are ordered by `order ASC`, then insertion order.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Bulk operations are single statements; no cross-call transaction.

use crate::db::DbError;
use crate::model::manual::{MainPoint, Manual, ManualValidationError};
use crate::model::month::Month;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MANUAL_SELECT_SQL: &str = "SELECT
    id,
    title,
    theme,
    week,
    display_date,
    memory_verse,
    scripture_text,
    introduction,
    main_points,
    class_discussion,
    conclusion,
    image_url,
    month,
    sort_order,
    created_at,
    updated_at
FROM manuals";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ManualValidationError),
    Db(DbError),
    /// No row with the given identifier.
    NotFound(String),
    /// A row with the given identifier already exists.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Conflict(id) => write!(f, "record already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ManualValidationError> for RepoError {
    fn from(value: ManualValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Content-store interface for manuals.
pub trait ManualRepository {
    fn insert_manual(&self, manual: &Manual) -> RepoResult<()>;
    fn get_manual(&self, id: &str) -> RepoResult<Option<Manual>>;
    /// Manuals of one month by `order`, at most `limit` rows when set.
    fn list_by_month(&self, month: Month, limit: Option<u32>) -> RepoResult<Vec<Manual>>;
    /// Every manual, by calendar month and then `order`.
    fn list_all(&self) -> RepoResult<Vec<Manual>>;
    /// First manual of `month` carrying `order`, in insertion order.
    fn find_by_month_and_order(&self, month: Month, order: i64) -> RepoResult<Option<Manual>>;
    fn update_manual(&self, manual: &Manual) -> RepoResult<()>;
    /// Removes one manual and returns the removed row.
    fn delete_manual(&self, id: &str) -> RepoResult<Option<Manual>>;
    /// Removes every manual and returns how many were removed.
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<usize>;
}

/// SQLite-backed manual repository.
pub struct SqliteManualRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteManualRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "manuals")? {
            return Err(RepoError::InvalidData(
                "manuals table missing; open the database with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl ManualRepository for SqliteManualRepository<'_> {
    fn insert_manual(&self, manual: &Manual) -> RepoResult<()> {
        manual.validate()?;
        let main_points = encode_main_points(&manual.main_points)?;

        let result = self.conn.execute(
            "INSERT INTO manuals (
                id,
                title,
                theme,
                week,
                display_date,
                memory_verse,
                scripture_text,
                introduction,
                main_points,
                class_discussion,
                conclusion,
                image_url,
                month,
                sort_order,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
            params![
                manual.id.as_str(),
                manual.title.as_str(),
                manual.theme.as_deref(),
                manual.week,
                manual.date.as_deref(),
                manual.memory_verse.as_deref(),
                manual.text.as_deref(),
                manual.introduction.as_deref(),
                main_points,
                manual.class_discussion.as_deref(),
                manual.conclusion.as_deref(),
                manual.image_url.as_deref(),
                manual.month.name(),
                manual.order,
                manual.created_at.timestamp_millis(),
                manual.updated_at.timestamp_millis(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(RepoError::Conflict(manual.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_manual(&self, id: &str) -> RepoResult<Option<Manual>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MANUAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_manual_row(row)?));
        }
        Ok(None)
    }

    fn list_by_month(&self, month: Month, limit: Option<u32>) -> RepoResult<Vec<Manual>> {
        let mut sql = format!("{MANUAL_SELECT_SQL} WHERE month = ? ORDER BY sort_order ASC, seq ASC");
        let mut bind_values: Vec<Value> = vec![Value::Text(month.name().to_string())];

        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut manuals = Vec::new();
        while let Some(row) = rows.next()? {
            manuals.push(parse_manual_row(row)?);
        }
        Ok(manuals)
    }

    fn list_all(&self) -> RepoResult<Vec<Manual>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MANUAL_SELECT_SQL} ORDER BY sort_order ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut manuals = Vec::new();
        while let Some(row) = rows.next()? {
            manuals.push(parse_manual_row(row)?);
        }

        // Stable sort keeps the per-month `order, seq` sequence intact.
        manuals.sort_by_key(|manual| manual.month.index());
        Ok(manuals)
    }

    fn find_by_month_and_order(&self, month: Month, order: i64) -> RepoResult<Option<Manual>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MANUAL_SELECT_SQL}
             WHERE month = ?1
               AND sort_order = ?2
             ORDER BY seq ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![month.name(), order])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_manual_row(row)?));
        }
        Ok(None)
    }

    fn update_manual(&self, manual: &Manual) -> RepoResult<()> {
        manual.validate()?;
        let main_points = encode_main_points(&manual.main_points)?;

        let changed = self.conn.execute(
            "UPDATE manuals
             SET
                title = ?1,
                theme = ?2,
                week = ?3,
                display_date = ?4,
                memory_verse = ?5,
                scripture_text = ?6,
                introduction = ?7,
                main_points = ?8,
                class_discussion = ?9,
                conclusion = ?10,
                image_url = ?11,
                month = ?12,
                sort_order = ?13,
                updated_at = ?14
             WHERE id = ?15;",
            params![
                manual.title.as_str(),
                manual.theme.as_deref(),
                manual.week,
                manual.date.as_deref(),
                manual.memory_verse.as_deref(),
                manual.text.as_deref(),
                manual.introduction.as_deref(),
                main_points,
                manual.class_discussion.as_deref(),
                manual.conclusion.as_deref(),
                manual.image_url.as_deref(),
                manual.month.name(),
                manual.order,
                manual.updated_at.timestamp_millis(),
                manual.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(manual.id.clone()));
        }
        Ok(())
    }

    fn delete_manual(&self, id: &str) -> RepoResult<Option<Manual>> {
        let Some(existing) = self.get_manual(id)? else {
            return Ok(None);
        };
        self.conn.execute("DELETE FROM manuals WHERE id = ?1;", [id])?;
        Ok(Some(existing))
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM manuals;", [])?;
        Ok(removed)
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM manuals;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative manual count `{count}`")))
    }
}

fn parse_manual_row(row: &Row<'_>) -> RepoResult<Manual> {
    let id: String = row.get("id")?;

    let month_text: String = row.get("month")?;
    let month = Month::from_name(&month_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid month `{month_text}` for manual `{id}`"))
    })?;

    let main_points_text: String = row.get("main_points")?;
    let main_points: Vec<MainPoint> = serde_json::from_str(&main_points_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid main_points for manual `{id}`: {err}"))
    })?;

    let manual = Manual {
        title: row.get("title")?,
        theme: row.get("theme")?,
        week: row.get("week")?,
        date: row.get("display_date")?,
        memory_verse: row.get("memory_verse")?,
        text: row.get("scripture_text")?,
        introduction: row.get("introduction")?,
        main_points,
        class_discussion: row.get("class_discussion")?,
        conclusion: row.get("conclusion")?,
        image_url: row.get("image_url")?,
        month,
        order: row.get("sort_order")?,
        created_at: millis_to_datetime(row.get("created_at")?, "created_at")?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "updated_at")?,
        id,
    };
    manual.validate()?;
    Ok(manual)
}

fn encode_main_points(points: &[MainPoint]) -> RepoResult<String> {
    serde_json::to_string(points)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode main_points: {err}")))
}

fn millis_to_datetime(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| RepoError::InvalidData(format!("invalid {column} value `{millis}`")))
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
