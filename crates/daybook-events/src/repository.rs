//! Repository seam between the event store and the remote event service.

use std::future::Future;

use chrono::NaiveDate;

use crate::error::EventError;
use crate::types::{Event, EventId, EventPatch, NewEvent};

/// Operations against the authoritative event service.
///
/// Each call is a single round trip with no retries or batching; the caller
/// decides how to react to failure.
pub trait EventRepository: Send + Sync {
    /// Fetch every stored event, in server order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Event>, EventError>> + Send;

    /// Fetch events on `date`, filtered server-side.
    fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Event>, EventError>> + Send;

    /// Fetch one event.
    ///
    /// Fails with `EventError::NotFound` when the id is unknown.
    fn get_by_id(&self, id: EventId) -> impl Future<Output = Result<Event, EventError>> + Send;

    /// Create an event; the returned record carries the assigned id.
    fn create(&self, event: &NewEvent) -> impl Future<Output = Result<Event, EventError>> + Send;

    /// Merge `patch` into the stored event and return the full updated record.
    ///
    /// Fails with `EventError::NotFound` when the id is unknown.
    fn update(
        &self,
        id: EventId,
        patch: &EventPatch,
    ) -> impl Future<Output = Result<Event, EventError>> + Send;

    /// Delete an event.
    fn delete(&self, id: EventId) -> impl Future<Output = Result<(), EventError>> + Send;
}
