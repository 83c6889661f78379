//! Add-event form state and the selectable time slots.

use chrono::{NaiveDate, NaiveTime};

use crate::error::EventError;
use crate::types::NewEvent;
use crate::validate::validate_new_event;

/// Color given to events when the form does not offer a picker.
pub const DEFAULT_COLOR: &str = "#8B7EC8";

/// Minutes between selectable times.
pub const SLOT_MINUTES: u32 = 10;

/// Selectable start/end times for the form, `00:00` through `23:50`.
pub fn time_slots() -> Vec<NaiveTime> {
    (0..24)
        .flat_map(|hour| {
            (0..60)
                .step_by(SLOT_MINUTES as usize)
                .filter_map(move |minute| NaiveTime::from_hms_opt(hour, minute, 0))
        })
        .collect()
}

/// Editable form contents before they become a `NewEvent`.
///
/// Location and memo are plain strings here because a form field is never
/// absent, only blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub color: String,
    pub location: String,
    pub memo: String,
}

impl EventDraft {
    /// Blank draft for `date`, pre-set to 09:00 - 10:00.
    pub fn new(date: NaiveDate) -> Self {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::with_defaults(date, DEFAULT_COLOR, start, end)
    }

    /// Blank draft using configured defaults.
    pub fn with_defaults(
        date: NaiveDate,
        color: &str,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            title: String::new(),
            date,
            start_time,
            end_time,
            color: color.to_string(),
            location: String::new(),
            memo: String::new(),
        }
    }

    /// Normalize and validate into a create request.
    ///
    /// # Errors
    /// Returns `EventError::Validation` if the title is blank or the range is empty.
    pub fn into_new_event(self) -> Result<NewEvent, EventError> {
        let event = NewEvent {
            title: self.title.trim().to_string(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            color: self.color,
            location: non_blank(self.location),
            memo: non_blank(self.memo),
        };
        validate_new_event(&event)?;
        Ok(event)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
