// File: meetbot-common/src/models/mod.rs
pub mod auth;
pub mod calendar;
pub mod conversation;
pub mod directory;
pub mod mail;
pub mod meeting;

pub use auth::{AccessToken, TokenOutcome};
pub use calendar::{
    Attendee, BusyInterval, CalendarEvent, CreatedEvent, DateTimeTimeZone, EventPayload,
    ItemBody, Location, ScheduleItem, ScheduleStatus, ScheduleWindow,
};
pub use conversation::{HeroCard, IncomingMessage, Reply};
pub use directory::{Contact, EmailAddress, FoundRoom, Room, UserProfile};
pub use mail::{MailMessage, Recipient};
pub use meeting::{MeetingDraft, MeetingField};
