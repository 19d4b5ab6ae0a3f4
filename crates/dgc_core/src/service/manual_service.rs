//! Manual use-case service.
//!
//! # Responsibility
//! - Validate administrative create/update input.
//! - Provide month listings, grouped listings, bulk clear and the
//!   recommended shortlist on top of `ManualRepository`.
//!
//! # Invariants
//! - Create requires a non-blank title, an exact month name and an order.
//! - Month path input is normalized with `Month::normalize` before lookup.
//! - Every update refreshes `updated_at`.

use crate::model::manual::{generate_manual_id, Manual, ManualId, ManualPatch, NewManual};
use crate::model::month::Month;
use crate::repo::manual_repo::{ManualRepository, RepoError};
use crate::service::recommend::{recommend, Recommendation};
use chrono::{NaiveDate, Utc};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Title, month, and order are required";
pub const INVALID_MONTH_MESSAGE: &str = "Invalid month";

/// Service error for manual use-cases.
#[derive(Debug)]
pub enum ManualServiceError {
    /// Input rejected before touching storage.
    Validation(String),
    /// Target manual does not exist.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ManualServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound(id) => write!(f, "Manual not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent manual state: {details}"),
        }
    }
}

impl Error for ManualServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ManualServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Conflict(id) => Self::Validation(format!("Manual `{id}` already exists")),
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

pub type ManualServiceResult<T> = Result<T, ManualServiceError>;

/// Manuals of one month, ordered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthListing {
    pub month: Month,
    pub manuals: Vec<Manual>,
}

/// Every manual grouped under all 12 months in calendar order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedManuals {
    pub by_month: BTreeMap<Month, Vec<Manual>>,
    pub total: usize,
}

/// Manual service facade over repository implementations.
pub struct ManualService<R: ManualRepository> {
    repo: R,
}

impl<R: ManualRepository> ManualService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new manual, generating an id when absent.
    pub fn create_manual(&self, input: NewManual) -> ManualServiceResult<Manual> {
        let (Some(title), Some(month_name), Some(order)) = (
            input.title.filter(|title| !title.trim().is_empty()),
            input.month.filter(|month| !month.is_empty()),
            input.order,
        ) else {
            return Err(ManualServiceError::Validation(
                REQUIRED_FIELDS_MESSAGE.to_string(),
            ));
        };
        let month = Month::from_name(&month_name)
            .ok_or_else(|| ManualServiceError::Validation(INVALID_MONTH_MESSAGE.to_string()))?;

        let now = Utc::now();
        let id = input
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_manual_id(month, order, now));

        let mut manual = Manual::new(id, title, month, order, now);
        manual.theme = input.theme;
        manual.week = input.week;
        manual.date = input.date;
        manual.memory_verse = input.memory_verse;
        manual.text = input.text;
        manual.introduction = input.introduction;
        manual.main_points = input.main_points.unwrap_or_default();
        manual.class_discussion = input.class_discussion;
        manual.conclusion = input.conclusion;
        manual.image_url = input.image_url;

        self.repo.insert_manual(&manual)?;
        info!(
            "event=manual_create module=service status=ok id={} month={} order={}",
            manual.id, manual.month, manual.order
        );

        self.repo
            .get_manual(&manual.id)?
            .ok_or(ManualServiceError::InconsistentState(
                "created manual not found in read-back",
            ))
    }

    /// Applies a partial update and returns the stored result.
    pub fn update_manual(&self, id: &str, patch: ManualPatch) -> ManualServiceResult<Manual> {
        let month = match patch.month.as_deref() {
            Some(name) => Some(Month::from_name(name).ok_or_else(|| {
                ManualServiceError::Validation(INVALID_MONTH_MESSAGE.to_string())
            })?),
            None => None,
        };
        if patch
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(ManualServiceError::Validation(
                "Title must not be blank".to_string(),
            ));
        }

        let mut manual = self
            .repo
            .get_manual(id)?
            .ok_or_else(|| ManualServiceError::NotFound(id.to_string()))?;
        patch.apply_to(&mut manual);
        if let Some(month) = month {
            manual.month = month;
        }
        manual.updated_at = Utc::now();

        self.repo.update_manual(&manual)?;
        info!(
            "event=manual_update module=service status=ok id={} month={} order={}",
            manual.id, manual.month, manual.order
        );

        self.repo
            .get_manual(id)?
            .ok_or(ManualServiceError::InconsistentState(
                "updated manual not found in read-back",
            ))
    }

    /// Deletes one manual and returns what was removed.
    pub fn delete_manual(&self, id: &str) -> ManualServiceResult<Manual> {
        let deleted = self
            .repo
            .delete_manual(id)?
            .ok_or_else(|| ManualServiceError::NotFound(id.to_string()))?;
        info!("event=manual_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    /// Gets one manual by id.
    pub fn get_manual(&self, id: &str) -> ManualServiceResult<Manual> {
        self.repo
            .get_manual(id)?
            .ok_or_else(|| ManualServiceError::NotFound(id.to_string()))
    }

    /// Lists one month's manuals; `raw_month` is normalized first.
    pub fn manuals_for_month(&self, raw_month: &str) -> ManualServiceResult<MonthListing> {
        let month = Month::normalize(raw_month)
            .ok_or_else(|| ManualServiceError::Validation(INVALID_MONTH_MESSAGE.to_string()))?;
        let manuals = self.repo.list_by_month(month, None)?;
        Ok(MonthListing { month, manuals })
    }

    /// Groups every manual under its month; all 12 months are present.
    pub fn manuals_grouped_by_month(&self) -> ManualServiceResult<GroupedManuals> {
        let mut by_month: BTreeMap<Month, Vec<Manual>> =
            Month::ALL.into_iter().map(|month| (month, Vec::new())).collect();
        let all = self.repo.list_all()?;
        let total = all.len();
        for manual in all {
            by_month.entry(manual.month).or_default().push(manual);
        }
        Ok(GroupedManuals { by_month, total })
    }

    /// Removes every manual and returns how many were removed.
    pub fn clear_all(&self) -> ManualServiceResult<usize> {
        let removed = self.repo.delete_all()?;
        info!("event=manual_clear module=service status=ok deleted_count={removed}");
        Ok(removed)
    }

    /// Number of stored manuals.
    pub fn count(&self) -> ManualServiceResult<usize> {
        Ok(self.repo.count()?)
    }

    /// Sets the image of the first manual filed under `month` with `order`.
    pub fn set_image_url(
        &self,
        month: Month,
        order: i64,
        image_url: impl Into<String>,
    ) -> ManualServiceResult<Manual> {
        let existing = self
            .repo
            .find_by_month_and_order(month, order)?
            .ok_or_else(|| ManualServiceError::NotFound(format!("{month} order {order}")))?;
        let id: ManualId = existing.id;
        self.update_manual(
            &id,
            ManualPatch {
                image_url: Some(Some(image_url.into())),
                ..ManualPatch::default()
            },
        )
    }

    /// Recommended shortlist for `today`.
    pub fn recommended(&self, today: NaiveDate) -> ManualServiceResult<Recommendation> {
        Ok(recommend(&self.repo, today)?)
    }
}
