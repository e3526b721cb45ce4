use chrono::NaiveDateTime;
use meetbot_common::models::{
    Attendee, DateTimeTimeZone, EmailAddress, EventPayload, ItemBody, Location, MeetingDraft,
    Recipient,
};

/// Assemble the `POST /me/events` body for a fully resolved draft.
///
/// `start`/`end` are local wall-clock times in `time_zone` (the organizer's
/// zone, under the calendar service's name for it).
pub fn build_event_payload(
    draft: &MeetingDraft,
    start: NaiveDateTime,
    end: NaiveDateTime,
    time_zone: &str,
    attendee_addresses: &[String],
    organizer_address: &str,
) -> EventPayload {
    EventPayload {
        subject: draft.subject.clone(),
        body: ItemBody {
            content_type: "HTML".to_string(),
            content: draft.content.clone(),
        },
        start: DateTimeTimeZone::from_naive(start, time_zone),
        end: DateTimeTimeZone::from_naive(end, time_zone),
        location: Location { display_name: draft.room.trim().to_string() },
        attendees: attendee_addresses.iter().map(Attendee::required).collect(),
        organizer: Recipient {
            email_address: EmailAddress::from_address(organizer_address),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> MeetingDraft {
        MeetingDraft {
            subject: "Quarterly review".into(),
            content: "<p>Numbers</p>".into(),
            start_time: "09:30".into(),
            end_time: "10:30".into(),
            room: "SH-3F-Lotus".into(),
            participants: "Alice,Bob".into(),
            organizer: String::new(),
        }
    }

    #[test]
    fn payload_survives_a_json_round_trip() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let attendees = vec!["alice@contoso.com".to_string(), "bob@contoso.com".to_string()];
        let payload = build_event_payload(
            &draft(),
            day.and_hms_opt(9, 30, 0).unwrap(),
            day.and_hms_opt(10, 30, 0).unwrap(),
            "China Standard Time",
            &attendees,
            "me@contoso.com",
        );

        let wire = serde_json::to_string(&payload).unwrap();
        let back: EventPayload = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.subject, "Quarterly review");
        assert_eq!(back.location.display_name, "SH-3F-Lotus");
        assert_eq!(back.attendees.len(), attendees.len());
        assert_eq!(back, payload);
    }

    #[test]
    fn payload_uses_graph_field_names() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let payload = build_event_payload(
            &draft(),
            day.and_hms_opt(9, 30, 0).unwrap(),
            day.and_hms_opt(10, 30, 0).unwrap(),
            "China Standard Time",
            &["alice@contoso.com".to_string()],
            "me@contoso.com",
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["body"]["contentType"], "HTML");
        assert_eq!(json["start"]["dateTime"], "2024-05-01T09:30:00");
        assert_eq!(json["start"]["timeZone"], "China Standard Time");
        assert_eq!(json["attendees"][0]["type"], "required");
        assert_eq!(json["attendees"][0]["emailAddress"]["address"], "alice@contoso.com");
        assert_eq!(json["organizer"]["emailAddress"]["address"], "me@contoso.com");
    }
}
