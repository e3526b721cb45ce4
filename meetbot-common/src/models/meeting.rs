// File: meetbot-common/src/models/meeting.rs

use std::fmt;
use serde::{Deserialize, Serialize};

/// The answers gathered by the booking dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDraft {
    pub subject: String,
    pub content: String,
    /// Local wall-clock time, `HH:MM`.
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    /// Raw comma-separated display names.
    pub participants: String,
    /// Filled in at commit time from the signed-in user's own address.
    pub organizer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetingField {
    Subject,
    Content,
    StartTime,
    EndTime,
    Room,
    Participants,
}

impl MeetingField {
    /// The six user-supplied fields in the order they are asked.
    pub const ASKED: [MeetingField; 6] = [
        MeetingField::Subject,
        MeetingField::Content,
        MeetingField::StartTime,
        MeetingField::EndTime,
        MeetingField::Room,
        MeetingField::Participants,
    ];
}

impl fmt::Display for MeetingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingField::Subject => write!(f, "subject"),
            MeetingField::Content => write!(f, "content"),
            MeetingField::StartTime => write!(f, "startTime"),
            MeetingField::EndTime => write!(f, "endTime"),
            MeetingField::Room => write!(f, "room"),
            MeetingField::Participants => write!(f, "participants"),
        }
    }
}

impl MeetingDraft {
    pub fn set(&mut self, field: MeetingField, answer: impl Into<String>) {
        let answer = answer.into();
        match field {
            MeetingField::Subject => self.subject = answer,
            MeetingField::Content => self.content = answer,
            MeetingField::StartTime => self.start_time = answer,
            MeetingField::EndTime => self.end_time = answer,
            MeetingField::Room => self.room = answer,
            MeetingField::Participants => self.participants = answer,
        }
    }

    pub fn get(&self, field: MeetingField) -> &str {
        match field {
            MeetingField::Subject => &self.subject,
            MeetingField::Content => &self.content,
            MeetingField::StartTime => &self.start_time,
            MeetingField::EndTime => &self.end_time,
            MeetingField::Room => &self.room,
            MeetingField::Participants => &self.participants,
        }
    }

    /// Fields the user still has to answer, in asking order.
    /// `room` may legitimately be left without a physical room, so only
    /// the others count.
    pub fn missing_fields(&self) -> Vec<MeetingField> {
        MeetingField::ASKED
            .iter()
            .copied()
            .filter(|f| *f != MeetingField::Room && self.get(*f).trim().is_empty())
            .collect()
    }

    /// Display names listed in `participants`, trimmed, blanks dropped.
    pub fn participant_names(&self) -> Vec<String> {
        self.participants
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
