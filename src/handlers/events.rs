use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use crate::handlers::AppState;
use crate::models::event::{parse_id, parse_timestamp, EventInputError};
use crate::models::{CreateEventRequest, DateRange, Event, EventResponse, UpdateEventRequest};
use crate::utils::response::{created, no_content, success};
use crate::utils::{AppError, Operation};

const EVENT_NOT_FOUND: &str = "Event not found";
const REQUIRED_FIELDS_MISSING: &str = "Title and start date are required";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListEventsParams {
    /// The requested window, if both bounds were given.
    fn range(self, op: Operation) -> Result<Option<DateRange>, AppError> {
        let start = self.start_date.filter(|s| !s.is_empty());
        let end = self.end_date.filter(|s| !s.is_empty());

        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(DateRange::new(
                timestamp(op, &start)?,
                timestamp(op, &end)?,
            ))),
            _ => Ok(None),
        }
    }
}

fn timestamp(op: Operation, raw: &str) -> Result<chrono::DateTime<chrono::Utc>, AppError> {
    parse_timestamp(raw).ok_or_else(|| AppError::invalid_input(op, format!("invalid date '{raw}'")))
}

fn input_error(op: Operation, err: EventInputError) -> AppError {
    match err {
        EventInputError::MissingRequired => {
            AppError::ValidationError(REQUIRED_FIELDS_MISSING.to_string())
        }
        EventInputError::InvalidTimestamp(_) => AppError::invalid_input(op, err),
    }
}

async fn find_existing(state: &AppState, raw_id: &str, op: Operation) -> Result<Event, AppError> {
    let not_found = || AppError::NotFound(EVENT_NOT_FOUND.to_string());

    let id = parse_id(raw_id).ok_or_else(not_found)?;
    state
        .store
        .find_unique(id)
        .await
        .map_err(AppError::storage(op))?
        .ok_or_else(not_found)
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let op = Operation::ListEvents;
    let Query(params) = params.map_err(|rejection| AppError::invalid_input(op, rejection))?;

    let range = params.range(op)?;
    let events = state
        .store
        .find_many(range)
        .await
        .map_err(AppError::storage(op))?;

    debug!(count = events.len(), filtered = range.is_some(), "Listed events");

    let body: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();
    Ok(success(body))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = find_existing(&state, &id, Operation::GetEvent).await?;
    Ok(success(EventResponse::from(event)))
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let op = Operation::CreateEvent;
    let Json(request) = body.map_err(|rejection| AppError::invalid_input(op, rejection))?;

    let fields = request
        .into_fields()
        .map_err(|err| input_error(op, err))?;
    let event = state
        .store
        .create(fields)
        .await
        .map_err(AppError::storage(op))?;

    info!(event_id = event.id, "Event created");

    Ok(created(EventResponse::from(event)))
}

/// PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let op = Operation::UpdateEvent;
    let existing = find_existing(&state, &id, op).await?;
    let Json(request) = body.map_err(|rejection| AppError::invalid_input(op, rejection))?;

    let fields = request
        .merge(&existing)
        .map_err(|err| input_error(op, err))?;
    let event = state
        .store
        .update(existing.id, fields)
        .await
        .map_err(AppError::storage(op))?;

    info!(event_id = event.id, "Event updated");

    Ok(success(EventResponse::from(event)))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let op = Operation::DeleteEvent;
    let existing = find_existing(&state, &id, op).await?;

    state
        .store
        .delete(existing.id)
        .await
        .map_err(AppError::storage(op))?;

    info!(event_id = existing.id, "Event deleted");

    Ok(no_content())
}
