//! Civil time helpers. Entries, upload prefixes and export names all use
//! Indian Standard Time wall-clock values, never UTC.

use time::{
    format_description::FormatItem, macros::format_description, macros::offset, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// IST has no daylight saving, so a fixed offset is exact.
pub const IST: UtcOffset = offset!(+5:30);

const DISPLAY: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const COMPACT: &[FormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");
const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year][month][day]");

/// Current IST wall-clock time, truncated to whole seconds.
pub fn now_ist() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(IST);
    let now = now.replace_nanosecond(0).unwrap_or(now);
    PrimitiveDateTime::new(now.date(), now.time())
}

/// `YYYY-MM-DD HH:MM:SS`, used on the dashboard and in exports.
pub fn display(ts: PrimitiveDateTime) -> String {
    ts.format(DISPLAY).unwrap_or_default()
}

/// `YYYYMMDDHHMMSS`, used to prefix stored uploads.
pub fn compact(ts: PrimitiveDateTime) -> String {
    ts.format(COMPACT).unwrap_or_default()
}

/// `YYYYMMDD`, used in export filenames.
pub fn date_stamp(ts: PrimitiveDateTime) -> String {
    ts.format(DATE_ONLY).unwrap_or_default()
}
