// File: meetbot-core/src/dialogs/meeting_dialog.rs
//! Collects the six meeting fields into the root-owned form, then signs in.

use meetbot_common::models::MeetingField;
use crate::dialogs::engine::{DialogResult, StepAction, StepContext, StepId, WaterfallId};
use crate::utils::time::parse_clock_time;
use crate::Error;

pub fn question(field: MeetingField) -> &'static str {
    match field {
        MeetingField::Subject => "Meeting's subject is?",
        MeetingField::Content => "Meeting's content is?",
        MeetingField::StartTime => "Meeting's start time is?",
        MeetingField::EndTime => "Meeting's end time is?",
        MeetingField::Room => "Meeting's room is?",
        MeetingField::Participants => "Meeting's participants have? (use ',' to separate)",
    }
}

/// The field whose answer `step` receives, if any.
pub fn answered_by(step: StepId) -> Option<MeetingField> {
    match step {
        StepId::MeetingContent => Some(MeetingField::Subject),
        StepId::MeetingStartTime => Some(MeetingField::Content),
        StepId::MeetingEndTime => Some(MeetingField::StartTime),
        StepId::MeetingRoom => Some(MeetingField::EndTime),
        StepId::MeetingParticipants => Some(MeetingField::Room),
        StepId::MeetingLogin => Some(MeetingField::Participants),
        _ => None,
    }
}

/// The field `step` asks for, if any.
pub fn asked_by(step: StepId) -> Option<MeetingField> {
    match step {
        StepId::MeetingSubject => Some(MeetingField::Subject),
        StepId::MeetingContent => Some(MeetingField::Content),
        StepId::MeetingStartTime => Some(MeetingField::StartTime),
        StepId::MeetingEndTime => Some(MeetingField::EndTime),
        StepId::MeetingRoom => Some(MeetingField::Room),
        StepId::MeetingParticipants => Some(MeetingField::Participants),
        _ => None,
    }
}

pub fn run(step: StepId, ctx: &mut StepContext<'_>, result: DialogResult) -> Result<StepAction, Error> {
    if let Some(field) = answered_by(step) {
        let answer = result.text().map(str::trim).unwrap_or_default();
        if let Some(retry) = validate(field, answer) {
            return Ok(StepAction::Reprompt(retry));
        }
        ctx.form.set(field, answer);
    }

    match asked_by(step) {
        Some(next) => Ok(StepAction::Prompt(question(next).to_string())),
        None if step == StepId::MeetingLogin => Ok(StepAction::BeginDialog(WaterfallId::SignIn)),
        None => Err(Error::Dialog(format!("{step:?} is not a meeting step"))),
    }
}

/// `Some(reprompt)` when `answer` cannot be stored for `field`.
fn validate(field: MeetingField, answer: &str) -> Option<String> {
    match field {
        // a meeting may be held without a physical room
        MeetingField::Room => None,
        MeetingField::StartTime | MeetingField::EndTime => parse_clock_time(answer)
            .err()
            .map(|_| format!("Please enter a time like 14:30. {}", question(field))),
        _ if answer.is_empty() => Some(question(field).to_string()),
        _ => None,
    }
}
