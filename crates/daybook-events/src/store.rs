//! Date-grouped event cache kept consistent with the event service.
//!
//! The cache only changes after a successful round trip, so it is never
//! ahead of the server. A failed call leaves it exactly as it was.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::error::EventError;
use crate::repository::EventRepository;
use crate::types::{Event, EventId, EventPatch, NewEvent};
use crate::validate::{validate_new_event, validate_patch};

/// Process-local view of every known event, grouped by date.
///
/// Every cached event lives in exactly one slot, keyed by its own `date`,
/// and empty slots are pruned. `index` maps each cached id to its slot.
pub struct EventStore<R> {
    repository: R,
    cache: BTreeMap<NaiveDate, Vec<Event>>,
    index: HashMap<EventId, NaiveDate>,
    ready: bool,
}

impl<R: EventRepository> EventStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            cache: BTreeMap::new(),
            index: HashMap::new(),
            ready: false,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// False until a full load has succeeded. Cache contents are not to be
    /// trusted while false.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Load every event from the server and rebuild the cache.
    ///
    /// # Errors
    /// Propagates the repository error; the cache is left empty and the
    /// store not ready.
    pub async fn initialize(&mut self) -> Result<(), EventError> {
        self.ready = false;

        match self.repository.list_all().await {
            Ok(events) => {
                self.replace_all(events);
                self.ready = true;
                tracing::info!(
                    "Event store loaded {} events across {} dates",
                    self.len(),
                    self.cache.len()
                );
                Ok(())
            }
            Err(e) => {
                self.cache.clear();
                self.index.clear();
                tracing::error!("Failed to load events: {}", e);
                Err(e)
            }
        }
    }

    /// Discard the cache and reload it from the server.
    ///
    /// The only way to pick up changes made by other clients.
    ///
    /// # Errors
    /// Same as [`EventStore::initialize`].
    pub async fn refresh(&mut self) -> Result<(), EventError> {
        tracing::debug!("Refreshing event store");
        self.initialize().await
    }

    /// Create an event and append the server's record to its date slot.
    ///
    /// # Errors
    /// `EventError::Validation` before any request if the title is blank or
    /// the time range is empty; otherwise the repository error.
    pub async fn add_event(&mut self, event: NewEvent) -> Result<Event, EventError> {
        validate_new_event(&event)?;

        let created = self.repository.create(&event).await.inspect_err(|e| {
            tracing::warn!("Create failed for event on {}: {}", event.date, e);
        })?;

        tracing::debug!("Created event {} on {}", created.id, created.date);
        self.insert_cached(created.clone());
        Ok(created)
    }

    /// Apply a partial update and re-slot the server's record under its
    /// (possibly new) date.
    ///
    /// # Errors
    /// `EventError::Validation` before any request if the merged fields are
    /// invalid; otherwise the repository error, including `NotFound`.
    pub async fn update_event(
        &mut self,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Event, EventError> {
        validate_patch(&patch, self.get_event_by_id(id))?;

        let updated = self.repository.update(id, &patch).await.inspect_err(|e| {
            tracing::warn!("Update failed for event {}: {}", id, e);
        })?;

        if updated.id != id {
            tracing::warn!("Server answered update of {} with event {}", id, updated.id);
            self.remove_cached(id);
        }

        tracing::debug!("Updated event {} now on {}", updated.id, updated.date);
        self.insert_cached(updated.clone());
        Ok(updated)
    }

    /// Delete an event and drop it from its slot.
    ///
    /// # Errors
    /// Propagates the repository error; the cache is unchanged.
    pub async fn delete_event(&mut self, id: EventId) -> Result<(), EventError> {
        self.repository.delete(id).await.inspect_err(|e| {
            tracing::warn!("Delete failed for event {}: {}", id, e);
        })?;

        if self.remove_cached(id).is_none() {
            tracing::debug!("Deleted event {} was not cached", id);
        }
        Ok(())
    }

    /// Events on `date` in insertion order. Never hits the network.
    pub fn get_events_for_date(&self, date: NaiveDate) -> &[Event] {
        self.cache.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_event_by_id(&self, id: EventId) -> Option<&Event> {
        let date = self.index.get(&id)?;
        self.cache.get(date)?.iter().find(|e| e.id == id)
    }

    /// Dates that have at least one event, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cache.keys().copied()
    }

    /// Non-empty slots within one month, ascending by date.
    pub fn events_in_month(&self, year: i32, month: u32) -> Vec<(NaiveDate, &[Event])> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };

        self.cache
            .range(first..)
            .take_while(|(date, _)| date.year() == year && date.month() == month)
            .map(|(date, events)| (*date, events.as_slice()))
            .collect()
    }

    /// Total number of cached events.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn replace_all(&mut self, events: Vec<Event>) {
        self.cache.clear();
        self.index.clear();
        for event in events {
            if self.index.contains_key(&event.id) {
                tracing::warn!("Server listed event {} more than once", event.id);
            }
            self.insert_cached(event);
        }
    }

    /// Put `event` in its own date slot, replacing any cached copy.
    ///
    /// A copy already in the same slot is replaced in place; otherwise the
    /// old copy is removed and the event appended to the new slot.
    fn insert_cached(&mut self, event: Event) {
        if self.index.get(&event.id) == Some(&event.date) {
            if let Some(existing) = self
                .cache
                .get_mut(&event.date)
                .and_then(|slot| slot.iter_mut().find(|e| e.id == event.id))
            {
                *existing = event;
                return;
            }
        }

        self.remove_cached(event.id);
        self.index.insert(event.id, event.date);
        self.cache.entry(event.date).or_default().push(event);
    }

    /// Remove a cached event, pruning its slot if it becomes empty.
    fn remove_cached(&mut self, id: EventId) -> Option<Event> {
        let date = self.index.remove(&id)?;
        let slot = self.cache.get_mut(&date)?;
        let position = slot.iter().position(|e| e.id == id)?;
        let removed = slot.remove(position);
        if slot.is_empty() {
            self.cache.remove(&date);
        }
        Some(removed)
    }
}
