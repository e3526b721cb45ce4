// File: meetbot-core/src/scheduling/orchestrator.rs

use std::sync::Arc;
use chrono::{Days, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info};

use meetbot_common::models::{AccessToken, CreatedEvent, MeetingDraft, ScheduleWindow};
use crate::config::BotConfig;
use crate::platforms::DirectoryService;
use crate::scheduling::conflict::{find_conflict, to_busy_intervals};
use crate::scheduling::contacts::{resolve_participants, UnresolvedName};
use crate::scheduling::payload::build_event_payload;
use crate::utils::time::{parse_clock_time, DISPLAY_FORMAT};
use crate::Error;

/// Reasons a booking is turned down. Each one aborts the booking and is shown
/// to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("'{value}' is not a valid time, please use HH:MM.")]
    InvalidTime { value: String },

    #[error("Please name at least one participant.")]
    NoParticipants,

    #[error(transparent)]
    UnresolvedParticipant(#[from] UnresolvedName),

    #[error("Room '{room}' does not exist.")]
    RoomNotFound { room: String },

    #[error("Room '{room}' is busy at {} to {}.", .start.format(DISPLAY_FORMAT), .end.format(DISPLAY_FORMAT))]
    SchedulingConflict {
        room: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Committed(CreatedEvent),
    Rejected(BookingRejection),
}

/// Runs the booking checks in order and commits the event when all pass.
pub struct MeetingOrchestrator {
    directory: Arc<dyn DirectoryService>,
    config: Arc<BotConfig>,
}

impl MeetingOrchestrator {
    pub fn new(directory: Arc<dyn DirectoryService>, config: Arc<BotConfig>) -> Self {
        Self { directory, config }
    }

    /// Book `draft` on `date` for `organizer`.
    ///
    /// Rejections come back as `Ok(BookingOutcome::Rejected(..))`; only
    /// failures of the directory service itself are `Err`.
    pub async fn book(
        &self,
        token: &AccessToken,
        draft: &MeetingDraft,
        organizer: &str,
        date: NaiveDate,
    ) -> Result<BookingOutcome, Error> {
        debug!("Booking '{}' on {} for {}", draft.subject, date, organizer);

        // 1) Clock times
        let (start, end) = match (parse_clock_time(&draft.start_time), parse_clock_time(&draft.end_time)) {
            (Ok(s), Ok(e)) => (date.and_time(s), date.and_time(e)),
            (Err(_), _) => return Ok(reject(BookingRejection::InvalidTime { value: draft.start_time.clone() })),
            (_, Err(_)) => return Ok(reject(BookingRejection::InvalidTime { value: draft.end_time.clone() })),
        };

        // 2) Participants
        let names = draft.participant_names();
        if names.is_empty() {
            return Ok(reject(BookingRejection::NoParticipants));
        }
        let contacts = self.directory.get_contacts(token).await?;
        let attendees = match resolve_participants(&names, &contacts) {
            Ok(a) => a,
            Err(unresolved) => return Ok(reject(unresolved.into())),
        };

        // 3) Room exists, 4) room is free
        let room = draft.room.trim();
        if !room.is_empty() {
            let rooms = self.directory.list_rooms(token, &self.config.room_prefix).await?;
            let Some(target) = rooms.iter().find(|r| r.is_named(room)) else {
                return Ok(reject(BookingRejection::RoomNotFound { room: room.to_string() }));
            };

            let day_start = date.and_hms_opt(0, 0, 0).unwrap_or(start);
            let day_end = date
                .checked_add_days(Days::new(1))
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or(end);
            let window = ScheduleWindow {
                start: day_start,
                end: day_end,
                time_zone: self.config.graph_time_zone.clone(),
            };
            let items = self.directory.get_room_schedule(token, target, &window).await?;
            let intervals = to_busy_intervals(&items, self.config.time_zone)?;
            if let Some(busy) = find_conflict(&intervals, start, end) {
                return Ok(reject(BookingRejection::SchedulingConflict {
                    room: room.to_string(),
                    start: busy.start,
                    end: busy.end,
                }));
            }
        }

        // 5) Commit
        let payload = build_event_payload(
            draft,
            start,
            end,
            &self.config.graph_time_zone,
            &attendees,
            organizer,
        );
        let created = self.directory.create_event(token, &payload).await?;
        info!("Created event '{}' ({}) with {} attendee(s)", draft.subject, created.id, attendees.len());
        Ok(BookingOutcome::Committed(created))
    }
}

fn reject(reason: BookingRejection) -> BookingOutcome {
    info!("Booking rejected: {}", reason);
    BookingOutcome::Rejected(reason)
}
