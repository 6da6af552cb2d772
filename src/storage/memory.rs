use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{DateRange, Event, EventFields};
use crate::storage::{EventStore, StorageError};

#[derive(Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Event>,
}

/// Process-local event table for development and tests.
///
/// Ids are assigned sequentially from 1, like a serial column. While offline every call fails
/// with `StorageError::Unavailable`.
#[derive(Default)]
pub struct InMemoryEventStore {
    table: RwLock<Table>,
    offline: AtomicBool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn find_many(&self, range: Option<DateRange>) -> Result<Vec<Event>, StorageError> {
        self.ensure_online()?;
        let table = self.table.read().await;

        let mut events: Vec<Event> = table
            .rows
            .values()
            .filter(|event| range.map_or(true, |range| range.matches(event)))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        Ok(events)
    }

    async fn find_unique(&self, id: i32) -> Result<Option<Event>, StorageError> {
        self.ensure_online()?;
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, fields: EventFields) -> Result<Event, StorageError> {
        self.ensure_online()?;
        let mut table = self.table.write().await;

        table.last_id += 1;
        let now = Utc::now();
        let event = Event {
            id: table.last_id,
            title: fields.title,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            is_all_day: fields.is_all_day,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(event.id, event.clone());

        Ok(event)
    }

    async fn update(&self, id: i32, fields: EventFields) -> Result<Event, StorageError> {
        self.ensure_online()?;
        let mut table = self.table.write().await;

        let event = table.rows.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        event.title = fields.title;
        event.description = fields.description;
        event.start_date = fields.start_date;
        event.end_date = fields.end_date;
        event.is_all_day = fields.is_all_day;
        event.updated_at = Utc::now();

        Ok(event.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), StorageError> {
        self.ensure_online()?;
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn fields(title: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> EventFields {
        EventFields {
            title: title.to_string(),
            description: None,
            start_date: start,
            end_date: end,
            is_all_day: false,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryEventStore::new();
        let first = store.create(fields("a", day(1), None)).await.unwrap();
        let second = store.create(fields("b", day(2), None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryEventStore::new();
        let first = store.create(fields("a", day(1), None)).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(fields("b", day(2), None)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_find_many_orders_by_start_date() {
        let store = InMemoryEventStore::new();
        store.create(fields("late", day(9), None)).await.unwrap();
        store.create(fields("early", day(2), None)).await.unwrap();
        store.create(fields("middle", day(5), None)).await.unwrap();

        let titles: Vec<String> = store
            .find_many(None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_find_many_applies_range() {
        let store = InMemoryEventStore::new();
        store.create(fields("before", day(1), Some(day(3)))).await.unwrap();
        store.create(fields("inside", day(6), Some(day(7)))).await.unwrap();
        store.create(fields("spanning", day(2), Some(day(20)))).await.unwrap();
        store.create(fields("after", day(15), None)).await.unwrap();

        let titles: Vec<String> = store
            .find_many(Some(DateRange::new(day(5), day(10))))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["spanning", "inside"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let store = InMemoryEventStore::new();

        assert!(matches!(
            store.update(99, fields("x", day(1), None)).await,
            Err(StorageError::NotFound(99))
        ));
        assert!(matches!(
            store.delete(99).await,
            Err(StorageError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = InMemoryEventStore::new();
        store.toggle_offline();

        assert!(matches!(
            store.find_many(None).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            store.create(fields("a", day(1), None)).await,
            Err(StorageError::Unavailable(_))
        ));

        store.toggle_offline();
        assert!(store.is_empty().await);
    }
}
