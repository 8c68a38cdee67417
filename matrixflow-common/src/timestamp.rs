use chrono::{DateTime, Local, TimeZone};

/// Wall-clock format sent to the sink: `HH:MM:SS.mmm`.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Format a point in time with millisecond precision.
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local wall-clock time as `HH:MM:SS.mmm`.
pub fn current_timestamp() -> String {
    format_timestamp(&Local::now())
}
