//! Calendar events for Daybook.
//!
//! Provides the event model, the repository seam with HTTP and in-memory
//! implementations, and the date-grouped `EventStore` cache.

pub mod client;
pub mod draft;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;
pub mod types;
pub mod validate;

pub use client::HttpEventRepository;
pub use draft::{time_slots, EventDraft};
pub use error::EventError;
pub use memory::InMemoryEventRepository;
pub use repository::EventRepository;
pub use store::EventStore;
pub use types::{Event, EventId, EventPatch, NewEvent};
