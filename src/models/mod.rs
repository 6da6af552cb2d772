pub mod date_range;
pub mod duration;
pub mod event;

pub use date_range::DateRange;
pub use duration::{calculate_duration, Duration};
pub use event::{CreateEventRequest, Event, EventFields, EventResponse, UpdateEventRequest};
