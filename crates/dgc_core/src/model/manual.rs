//! Manual domain model.
//!
//! # Responsibility
//! - Define the weekly teaching record served to the bulletin client.
//! - Define create/update input shapes as they arrive on the wire.
//!
//! # Invariants
//! - `id` is unique and never reassigned by an update.
//! - `title` is never blank.
//! - `order` only drives sorting inside a month; duplicates are allowed.

use crate::model::month::Month;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable manual identifier, caller-assigned or generated at creation.
pub type ManualId = String;

/// One numbered point of a manual's teaching outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainPoint {
    pub title: String,
    pub description: String,
    /// Scripture references in reading order.
    pub references: Vec<String>,
}

/// One week of teaching content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manual {
    pub id: ManualId,
    pub title: String,
    pub theme: Option<String>,
    /// Informational week label; rotation never reads it.
    pub week: Option<i64>,
    /// Free-text display date such as `January 4, 2026`.
    pub date: Option<String>,
    pub memory_verse: Option<String>,
    /// Scripture reference for the lesson.
    pub text: Option<String>,
    pub introduction: Option<String>,
    pub main_points: Vec<MainPoint>,
    pub class_discussion: Option<String>,
    pub conclusion: Option<String>,
    pub image_url: Option<String>,
    pub month: Month,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation failure for manual invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualValidationError {
    BlankId,
    BlankTitle,
}

impl Display for ManualValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "manual id must not be blank"),
            Self::BlankTitle => write!(f, "manual title must not be blank"),
        }
    }
}

impl Error for ManualValidationError {}

impl Manual {
    /// Creates a manual with empty optional content and both timestamps set
    /// to `now`.
    pub fn new(
        id: impl Into<ManualId>,
        title: impl Into<String>,
        month: Month,
        order: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            theme: None,
            week: None,
            date: None,
            memory_verse: None,
            text: None,
            introduction: None,
            main_points: Vec::new(),
            class_discussion: None,
            conclusion: None,
            image_url: None,
            month,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks invariants enforced before every write.
    pub fn validate(&self) -> Result<(), ManualValidationError> {
        if self.id.trim().is_empty() {
            return Err(ManualValidationError::BlankId);
        }
        if self.title.trim().is_empty() {
            return Err(ManualValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Builds the identifier used when a create request carries none.
pub fn generate_manual_id(month: Month, order: i64, now: DateTime<Utc>) -> ManualId {
    format!(
        "{}_{}_{}",
        month.name().to_lowercase(),
        order,
        now.timestamp_millis()
    )
}

/// Create request as received from administrative callers.
///
/// Every field is optional here so that missing values surface as
/// validation errors rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewManual {
    pub id: Option<ManualId>,
    pub title: Option<String>,
    pub theme: Option<String>,
    pub week: Option<i64>,
    pub date: Option<String>,
    pub memory_verse: Option<String>,
    pub text: Option<String>,
    pub introduction: Option<String>,
    pub main_points: Option<Vec<MainPoint>>,
    pub class_discussion: Option<String>,
    pub conclusion: Option<String>,
    pub image_url: Option<String>,
    pub month: Option<String>,
    pub order: Option<i64>,
}

/// Partial update; only present fields replace stored values.
///
/// Nullable fields use `Option<Option<T>>`: an absent key is `None`, while an
/// explicit JSON `null` is `Some(None)` and clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualPatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub theme: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub week: Option<Option<i64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub memory_verse: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub text: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Option<String>>,
    pub main_points: Option<Vec<MainPoint>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub class_discussion: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    pub month: Option<String>,
    pub order: Option<i64>,
}

/// Only called for keys present in the payload, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ManualPatch {
    /// Copies every present field except `month`, which callers resolve and
    /// validate separately.
    pub fn apply_to(self, manual: &mut Manual) {
        fn replace<T>(slot: &mut Option<T>, value: Option<Option<T>>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(title) = self.title {
            manual.title = title;
        }
        replace(&mut manual.theme, self.theme);
        replace(&mut manual.week, self.week);
        replace(&mut manual.date, self.date);
        replace(&mut manual.memory_verse, self.memory_verse);
        replace(&mut manual.text, self.text);
        replace(&mut manual.introduction, self.introduction);
        if let Some(main_points) = self.main_points {
            manual.main_points = main_points;
        }
        replace(&mut manual.class_discussion, self.class_discussion);
        replace(&mut manual.conclusion, self.conclusion);
        replace(&mut manual.image_url, self.image_url);
        if let Some(order) = self.order {
            manual.order = order;
        }
    }
}
