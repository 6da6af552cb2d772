use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateRange, Event, EventFields};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event {0} does not exist")]
    NotFound(i32),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for events. Handlers only talk to storage through this trait.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events overlapping `range`, or every event when there is none, ascending by start date.
    async fn find_many(&self, range: Option<DateRange>) -> Result<Vec<Event>, StorageError>;

    async fn find_unique(&self, id: i32) -> Result<Option<Event>, StorageError>;

    async fn create(&self, fields: EventFields) -> Result<Event, StorageError>;

    /// Overwrites every writable column. Fails with `NotFound` if the row is gone.
    async fn update(&self, id: i32, fields: EventFields) -> Result<Event, StorageError>;

    async fn delete(&self, id: i32) -> Result<(), StorageError>;
}
