// File: meetbot-common/src/models/calendar.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::models::directory::EmailAddress;
use crate::models::mail::Recipient;

/// Graph's `dateTimeTimeZone`: a wall-clock time plus the zone it is in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub const WIRE_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S";

    pub fn from_naive(dt: NaiveDateTime, time_zone: &str) -> Self {
        Self {
            date_time: dt.format(Self::WIRE_FORMAT).to_string(),
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleStatus {
    Free,
    Tentative,
    Busy,
    Oof,
    WorkingElsewhere,
    #[serde(other)]
    Unknown,
}

/// Entry of a `getSchedule` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub status: ScheduleStatus,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
}

/// The interval a schedule lookup covers, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Zone name sent to the calendar service alongside the window.
    pub time_zone: String,
}

/// A schedule item after its boundaries were normalized to local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email_address: EmailAddress,
    #[serde(rename = "type")]
    pub attendee_type: String,
}

impl Attendee {
    pub fn required(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress::from_address(address),
            attendee_type: "required".to_string(),
        }
    }
}

/// Body of `POST /me/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub subject: String,
    pub body: ItemBody,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub location: Location,
    pub attendees: Vec<Attendee>,
    pub organizer: Recipient,
}

/// What the calendar service hands back after creating an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    pub subject: Option<String>,
    pub web_link: Option<String>,
    pub start: Option<DateTimeTimeZone>,
    pub end: Option<DateTimeTimeZone>,
}

/// Entry of `GET /me/events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub subject: Option<String>,
    pub organizer: Option<Recipient>,
    pub start: Option<DateTimeTimeZone>,
    pub end: Option<DateTimeTimeZone>,
    pub location: Option<Location>,
}
