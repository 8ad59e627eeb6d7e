use crate::error::AppError;
use crate::model::TaskStatus;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Calendar dates are stored without a time or offset component.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Behaviour shared by both task schemas so the store, persistence and view
/// layers can be written once.
pub trait TaskRecord: Clone + Serialize + DeserializeOwned {
    /// Fields supplied by the user when creating a task.
    type Draft;
    /// Partial update; `None` fields are left untouched.
    type Patch;

    /// Key the full task sequence is persisted under.
    const STORE_KEY: &'static str;
    /// Whether the schema carries an order worth sorting by. Unsortable
    /// schemas are always shown in insertion order.
    const SORTABLE: bool;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn is_completed(&self) -> bool;
    fn status(&self) -> TaskStatus;
    fn deadline(&self) -> Option<Date>;

    /// Builds a new record, rejecting drafts that fail the schema's rules.
    fn from_draft(draft: Self::Draft, id: String, created_at: OffsetDateTime)
    -> Result<Self, AppError>;

    /// Applies `patch` in place. Must either apply every field or none.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<(), AppError>;
}

pub fn new_task_id() -> String {
    format!("task-{}", uuid::Uuid::now_v7())
}

pub fn required_title(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("date must be YYYY-MM-DD, got '{}'", raw.trim())))
}

pub fn format_date(date: Date) -> String {
    // Formatting a Date with a date-only description cannot fail.
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

pub(crate) fn unix_epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

pub(crate) mod calendar_date {
    use super::{DATE_FORMAT, format_date};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Date::parse(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::{DATE_FORMAT, format_date};
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&format_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => Date::parse(&raw, DATE_FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
