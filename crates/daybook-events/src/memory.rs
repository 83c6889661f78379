//! In-process stand-in for the remote event service.
//!
//! Follows the same contract as the HTTP API: sequential id assignment,
//! partial-merge updates, `NotFound` for unknown ids. Also counts calls and
//! can be told to fail the next one, which makes it the store's test double.

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::error::EventError;
use crate::repository::EventRepository;
use crate::types::{Event, EventId, EventPatch, NewEvent};
use crate::validate::validate_title;

#[derive(Debug)]
struct State {
    events: Vec<Event>,
    next_id: EventId,
    calls: usize,
    fail_next: Option<u16>,
}

#[derive(Debug)]
pub struct InMemoryEventRepository {
    state: Mutex<State>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::with_events(Vec::new())
    }

    /// Seed with existing events; new ids continue after the largest seeded one.
    pub fn with_events(events: Vec<Event>) -> Self {
        let next_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                events,
                next_id,
                calls: 0,
                fail_next: None,
            }),
        }
    }

    /// Number of repository calls received so far, including failed ones.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    /// Make the next call fail with an API error carrying `status`.
    pub fn fail_next_call(&self, status: u16) {
        self.state.lock().fail_next = Some(status);
    }

    /// Snapshot of the stored events in server order.
    pub fn snapshot(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    /// Change stored data without going through the repository API, as
    /// another client would. Not counted as a call.
    pub fn modify_externally(&self, f: impl FnOnce(&mut Vec<Event>)) {
        let mut state = self.state.lock();
        f(&mut state.events);
        let max = state.events.iter().map(|e| e.id).max().unwrap_or(0);
        if state.next_id <= max {
            state.next_id = max + 1;
        }
    }

    /// Record a call and consume any pending injected failure.
    fn begin_call(state: &mut State) -> Result<(), EventError> {
        state.calls += 1;
        match state.fail_next.take() {
            Some(status) => Err(EventError::Api {
                status,
                message: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRepository for InMemoryEventRepository {
    async fn list_all(&self) -> Result<Vec<Event>, EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        Ok(state.events.clone())
    }

    async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Event>, EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.date == date)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: EventId) -> Result<Event, EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        state
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(EventError::NotFound(id))
    }

    async fn create(&self, event: &NewEvent) -> Result<Event, EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        validate_title(&event.title)?;

        let id = state.next_id;
        state.next_id += 1;
        let created = Event::from_new(id, event.clone());
        state.events.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: EventId, patch: &EventPatch) -> Result<Event, EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        let stored = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EventError::NotFound(id))?;
        patch.apply_to(stored);
        Ok(stored.clone())
    }

    async fn delete(&self, id: EventId) -> Result<(), EventError> {
        let mut state = self.state.lock();
        Self::begin_call(&mut state)?;
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() == before {
            return Err(EventError::NotFound(id));
        }
        Ok(())
    }
}
