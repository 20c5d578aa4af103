//! Recent-search history: a most-recent-first list capped at five entries,
//! stored as the flat slots `rs1`..`rs5` of a user document.
//!
//! Writes are read-modify-write against the store with no version check, so two
//! concurrent insertions for the same user can lose one update (last writer wins).

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::{RecentSearch, RECENT_SEARCH_FIELDS};

pub const CAPACITY: usize = RECENT_SEARCH_FIELDS.len();

/// A single field of the most recent entry that may be replaced in place.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestField {
    MedianSalary(String),
    Url(String),
}

/// Puts `entry` in front of `current` and keeps the first `CAPACITY` entries.
/// No de-duplication: the same search recorded twice occupies two slots.
pub fn insert(current: &[RecentSearch], entry: RecentSearch) -> Vec<RecentSearch> {
    let mut updated = Vec::with_capacity(CAPACITY);
    updated.push(entry);
    updated.extend(current.iter().take(CAPACITY - 1).cloned());
    updated
}

/// Returns the position-1 entry with `field` replaced. Older entries are never touched.
pub fn patch_most_recent(
    current: &[RecentSearch],
    field: LatestField,
) -> Result<RecentSearch, AppError> {
    let mut latest = current
        .first()
        .cloned()
        .ok_or_else(|| AppError::NotFound("No recent searches recorded".to_string()))?;

    match field {
        LatestField::MedianSalary(value) => latest.med_salary = value,
        LatestField::Url(value) => latest.url = Some(value),
    }

    Ok(latest)
}

/// Reads the occupied slots in stored order. Empty slots are skipped, and so
/// are slots holding something other than a search (a profile update can write
/// anything there); the next insert rewrites all five slots.
pub fn read_slots(fields: &Map<String, Value>) -> Vec<RecentSearch> {
    RECENT_SEARCH_FIELDS
        .iter()
        .filter_map(|slot| fields.get(*slot).map(|value| (*slot, value)))
        .filter(|(_, value)| !value.is_null())
        .filter_map(|(slot, value)| match RecentSearch::deserialize(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(slot, "Ignoring malformed recent search: {e}");
                None
            }
        })
        .collect()
}

/// Lays `entries` out over all five slots. Slots past the end are set to `null`
/// so the write fully replaces whatever history was stored before.
pub fn to_slots(entries: &[RecentSearch]) -> Result<Map<String, Value>, serde_json::Error> {
    let mut slots = Map::new();
    for (i, slot) in RECENT_SEARCH_FIELDS.iter().enumerate() {
        let value = match entries.get(i) {
            Some(entry) => serde_json::to_value(entry)?,
            None => Value::Null,
        };
        slots.insert(slot.to_string(), value);
    }
    Ok(slots)
}

/// Builds the single-slot patch that rewrites only the most recent entry.
pub fn latest_slot(entry: &RecentSearch) -> Result<Map<String, Value>, serde_json::Error> {
    let mut slots = Map::new();
    slots.insert(RECENT_SEARCH_FIELDS[0].to_string(), serde_json::to_value(entry)?);
    Ok(slots)
}
