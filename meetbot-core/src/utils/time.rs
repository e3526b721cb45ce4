use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use meetbot_common::models::DateTimeTimeZone;
use crate::Error;

/// Format used whenever a local time is shown to the user.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a clock time typed by the user, `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, Error> {
    let s = raw.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| Error::Parse(format!("'{s}' is not a clock time: {e}")))
}

/// Parse the `dateTime` half of a Graph `dateTimeTimeZone`.
/// Graph sends seven fractional digits, e.g. `2024-05-01T09:00:00.0000000`.
pub fn parse_graph_datetime(raw: &str) -> Result<NaiveDateTime, Error> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| Error::Parse(format!("'{raw}' is not a Graph dateTime: {e}")))
}

/// Convert a Graph timestamp into wall-clock time in `local`.
///
/// `UTC` and IANA zone names are converted. Any other zone name (Windows
/// names such as "China Standard Time") is what we asked the service for,
/// so the value is already local. This holds because `BotConfig` refuses a
/// calendar zone name whose offsets differ from `local`.
pub fn to_local(dt: &DateTimeTimeZone, local: Tz) -> Result<NaiveDateTime, Error> {
    let naive = parse_graph_datetime(&dt.date_time)?;
    if dt.time_zone.eq_ignore_ascii_case("UTC") {
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(&local).naive_local());
    }
    match dt.time_zone.parse::<Tz>() {
        Ok(source) => source
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&local).naive_local())
            .ok_or_else(|| Error::Parse(format!("{} does not exist in {}", naive, dt.time_zone))),
        Err(_) => Ok(naive),
    }
}

pub fn format_local(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Today's date in the given zone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Current wall-clock time in the given zone.
pub fn now_in(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_accepts_minutes_and_seconds() {
        assert_eq!(parse_clock_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_clock_time(" 14:05:10 ").unwrap(), NaiveTime::from_hms_opt(14, 5, 10).unwrap());
        assert!(parse_clock_time("half past nine").is_err());
    }

    #[test]
    fn utc_schedule_times_are_shifted_to_local() {
        let dt = DateTimeTimeZone {
            date_time: "2024-05-01T01:00:00.0000000".into(),
            time_zone: "UTC".into(),
        };
        let local = to_local(&dt, chrono_tz::Asia::Shanghai).unwrap();
        assert_eq!(format_local(local), "2024-05-01 09:00:00");
    }

    #[test]
    fn windows_zone_names_are_taken_as_local() {
        let dt = DateTimeTimeZone {
            date_time: "2024-05-01T09:00:00".into(),
            time_zone: "China Standard Time".into(),
        };
        let local = to_local(&dt, chrono_tz::Asia::Shanghai).unwrap();
        assert_eq!(format_local(local), "2024-05-01 09:00:00");
    }

    #[test]
    fn iana_zone_names_are_converted() {
        let dt = DateTimeTimeZone {
            date_time: "2024-05-01T03:00:00".into(),
            time_zone: "Europe/London".into(),
        };
        // BST is UTC+1, Shanghai UTC+8.
        let local = to_local(&dt, chrono_tz::Asia::Shanghai).unwrap();
        assert_eq!(format_local(local), "2024-05-01 10:00:00");
    }
}
