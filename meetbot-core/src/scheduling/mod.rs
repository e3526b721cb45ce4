//! Meeting scheduling: who is invited, whether the room is free, and what
//! gets sent to the calendar service.

pub mod conflict;
pub mod contacts;
pub mod orchestrator;
pub mod payload;

pub use conflict::{find_conflict, has_conflict, to_busy_intervals};
pub use contacts::{resolve_participants, UnresolvedName};
pub use orchestrator::{BookingOutcome, BookingRejection, MeetingOrchestrator};
pub use payload::build_event_payload;
