use chrono::NaiveDateTime;
use chrono_tz::Tz;
use meetbot_common::models::{BusyInterval, ScheduleItem, ScheduleStatus};
use crate::utils::time::to_local;
use crate::Error;

/// Normalize schedule items to local wall-clock intervals, keeping service order.
pub fn to_busy_intervals(items: &[ScheduleItem], local: Tz) -> Result<Vec<BusyInterval>, Error> {
    items
        .iter()
        .map(|item| {
            Ok(BusyInterval {
                start: to_local(&item.start, local)?,
                end: to_local(&item.end, local)?,
                status: item.status,
            })
        })
        .collect()
}

/// First busy interval that a requested boundary falls strictly inside of.
///
/// Touching boundaries (`10:00` after a `09:00-10:00` slot) are not conflicts.
/// Only `busy` entries are considered.
pub fn find_conflict(
    intervals: &[BusyInterval],
    requested_start: NaiveDateTime,
    requested_end: NaiveDateTime,
) -> Option<&BusyInterval> {
    intervals
        .iter()
        .filter(|b| b.status == ScheduleStatus::Busy)
        .find(|b| {
            (b.start < requested_start && requested_start < b.end)
                || (b.start < requested_end && requested_end < b.end)
        })
}

pub fn has_conflict(
    intervals: &[BusyInterval],
    requested_start: NaiveDateTime,
    requested_end: NaiveDateTime,
) -> bool {
    find_conflict(intervals, requested_start, requested_end).is_some()
}
