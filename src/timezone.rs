//! Converts between points in time and the user's local calendar.
//!
//! The UTC offset is looked up for each date, so days and months stay correct
//! on both sides of a daylight saving change.

use time::{Date, OffsetDateTime, PrimitiveDateTime};
use time_tz::{OffsetDateTimeExt, OffsetResult, PrimitiveDateTimeExt, Tz, timezones};

use crate::Error;

/// Look up the timezone for `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the name is not a known IANA timezone.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}

/// `date_time` expressed with the offset `timezone` had at that moment.
pub fn to_local(date_time: OffsetDateTime, timezone: &Tz) -> OffsetDateTime {
    date_time.to_timezone(timezone)
}

/// The first moment of `date` in `timezone`.
pub fn start_of_day(date: Date, timezone: &Tz) -> OffsetDateTime {
    resolve_local(date.midnight(), timezone, std::cmp::min)
}

/// The last millisecond of `date` in `timezone`.
pub fn end_of_day(date: Date, timezone: &Tz) -> OffsetDateTime {
    resolve_local(
        PrimitiveDateTime::new(date, time::macros::time!(23:59:59.999)),
        timezone,
        std::cmp::max,
    )
}

/// Attach the offset in force at a wall clock time.
///
/// A time repeated by a backwards change resolves with `pick`. A time skipped
/// by a forwards change takes the offset in force at that instant in UTC.
fn resolve_local(
    local: PrimitiveDateTime,
    timezone: &Tz,
    pick: fn(OffsetDateTime, OffsetDateTime) -> OffsetDateTime,
) -> OffsetDateTime {
    match local.assume_timezone(timezone) {
        OffsetResult::Some(date_time) => date_time,
        OffsetResult::Ambiguous(first, second) => pick(first, second),
        OffsetResult::None => local.assume_timezone_utc(timezone),
    }
}
