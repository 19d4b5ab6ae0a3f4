//! Weekly rotation of recommended manuals.
//!
//! # Responsibility
//! - Map a calendar date to the primary/secondary month pair.
//! - Compose the recommended shortlist from two ordered month batches.
//!
//! # Invariants
//! - The selection is a pure function of the date and the stored manuals.
//! - At most `RECOMMENDED_LEN` manuals are returned; short months are never
//!   padded.
//! - A failure in either month query fails the whole selection.

use crate::model::manual::Manual;
use crate::model::month::Month;
use crate::repo::manual_repo::{ManualRepository, RepoResult};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;

/// Maximum number of recommended manuals.
pub const RECOMMENDED_LEN: usize = 4;
/// Slots always taken from the primary month.
const PRIMARY_SLOTS: usize = 3;
/// Weeks spent on each month before the rotation advances.
const WEEKS_PER_MONTH: u32 = 4;

/// Month pair selected for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    /// Days since the start of the year, January 1 = 1.
    pub day_of_year: u32,
    /// Zero-based week count, `day_of_year / 7`.
    pub week_number: u32,
    /// Index into `Month::ALL`, clamped to December.
    pub month_bucket: usize,
    pub primary_month: Month,
    pub secondary_month: Month,
}

/// Recommended shortlist together with the rotation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub manuals: Vec<Manual>,
    pub week_number: u32,
    pub primary_month: Month,
    pub secondary_month: Month,
}

/// Computes the rotation for a calendar date.
pub fn rotation_for(date: NaiveDate) -> Rotation {
    rotation_for_day(date.ordinal())
}

/// Computes the rotation for a day-of-year value (January 1 = 1).
pub fn rotation_for_day(day_of_year: u32) -> Rotation {
    let week_number = day_of_year / 7;
    let bucket = (week_number / WEEKS_PER_MONTH) as usize;
    let month_bucket = bucket.min(Month::ALL.len() - 1);
    let primary_month = Month::ALL[month_bucket];

    Rotation {
        day_of_year,
        week_number,
        month_bucket,
        primary_month,
        secondary_month: primary_month.next(),
    }
}

/// Builds the shortlist: the first three primary manuals followed by the
/// first secondary manual, or by the fourth primary manual when the
/// secondary month has none.
pub fn compose_recommendation(primary: Vec<Manual>, secondary: Vec<Manual>) -> Vec<Manual> {
    let mut primary = primary.into_iter();
    let mut manuals: Vec<Manual> = primary.by_ref().take(PRIMARY_SLOTS).collect();

    match secondary.into_iter().next() {
        Some(first_secondary) => manuals.push(first_secondary),
        None => manuals.extend(primary.next()),
    }

    manuals
}

/// Selects the recommended manuals for `today`.
pub fn recommend<R: ManualRepository + ?Sized>(
    repo: &R,
    today: NaiveDate,
) -> RepoResult<Recommendation> {
    let rotation = rotation_for(today);

    let primary = repo.list_by_month(rotation.primary_month, Some(RECOMMENDED_LEN as u32))?;
    let secondary = repo.list_by_month(rotation.secondary_month, Some(1))?;
    debug!(
        "event=recommend module=service status=ok date={} week={} primary={} primary_count={} secondary={} secondary_count={}",
        today,
        rotation.week_number,
        rotation.primary_month,
        primary.len(),
        rotation.secondary_month,
        secondary.len()
    );

    Ok(Recommendation {
        manuals: compose_recommendation(primary, secondary),
        week_number: rotation.week_number,
        primary_month: rotation.primary_month,
        secondary_month: rotation.secondary_month,
    })
}
