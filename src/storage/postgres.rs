use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{DateRange, Event, EventFields};
use crate::storage::{EventStore, StorageError};

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn find_many(&self, range: Option<DateRange>) -> Result<Vec<Event>, StorageError> {
        let rows = match range {
            Some(range) => {
                sqlx::query_as::<_, Event>(
                    r#"
                    SELECT id, title, description, start_date, end_date, is_all_day, created_at, updated_at
                    FROM events
                    WHERE (start_date >= $1 AND start_date <= $2)
                       OR (start_date < $1 AND end_date > $2)
                       OR (end_date >= $1 AND end_date <= $2)
                    ORDER BY start_date ASC, id ASC
                    "#,
                )
                .bind(range.start)
                .bind(range.end)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>(
                    r#"
                    SELECT id, title, description, start_date, end_date, is_all_day, created_at, updated_at
                    FROM events
                    ORDER BY start_date ASC, id ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn find_unique(&self, id: i32) -> Result<Option<Event>, StorageError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_date, end_date, is_all_day, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, fields: EventFields) -> Result<Event, StorageError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, start_date, end_date, is_all_day)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, start_date, end_date, is_all_day, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.is_all_day)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: i32, fields: EventFields) -> Result<Event, StorageError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET
                title = $2,
                description = $3,
                start_date = $4,
                end_date = $5,
                is_all_day = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, start_date, end_date, is_all_day, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.is_all_day)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StorageError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        Ok(())
    }
}
