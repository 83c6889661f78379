//! Client-side checks run before any request is issued.

use chrono::NaiveTime;

use crate::error::EventError;
use crate::types::{Event, EventPatch, NewEvent};

/// Title must contain something other than whitespace.
///
/// # Errors
/// Returns `EventError::Validation` if the title is blank.
pub fn validate_title(title: &str) -> Result<(), EventError> {
    if title.trim().is_empty() {
        return Err(EventError::validation("Title is required"));
    }
    Ok(())
}

/// End must be strictly later than start.
///
/// # Errors
/// Returns `EventError::Validation` if `start >= end`.
pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), EventError> {
    if start >= end {
        return Err(EventError::validation(
            "End time must be later than start time",
        ));
    }
    Ok(())
}

/// # Errors
/// Returns `EventError::Validation` if the title is blank or the range is empty.
pub fn validate_new_event(event: &NewEvent) -> Result<(), EventError> {
    validate_title(&event.title)?;
    validate_time_range(event.start_time, event.end_time)
}

/// Check a partial update against the event it will be merged into.
///
/// Times missing from the patch are taken from `current`. When `current` is
/// unknown and only one bound is supplied, the range is left to the server.
///
/// # Errors
/// Returns `EventError::Validation` if a supplied title is blank or the merged range is empty.
pub fn validate_patch(patch: &EventPatch, current: Option<&Event>) -> Result<(), EventError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }

    let start = patch.start_time.or(current.map(|e| e.start_time));
    let end = patch.end_time.or(current.map(|e| e.end_time));
    if let (Some(start), Some(end)) = (start, end) {
        validate_time_range(start, end)?;
    }

    Ok(())
}
