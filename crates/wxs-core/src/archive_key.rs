//! Date-partitioned archive keys
//!
//! Keys come from the archiving process's own clock, not from any time
//! embedded in the observation. Resolution is one second: two records
//! archived within the same second share a key and the later write wins.

use chrono::{Datelike, NaiveDateTime};

/// Filename timestamp, e.g. `05-03-2024-14:22:07`
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H:%M:%S";

/// `raw/year=YYYY/month=M/day=D/weather_data_<dd-MM-yyyy-HH:mm:ss>.json`,
/// with unpadded month and day segments.
pub fn archive_key(now: NaiveDateTime) -> String {
    format!(
        "raw/year={}/month={}/day={}/weather_data_{}.json",
        now.year(),
        now.month(),
        now.day(),
        now.format(ARCHIVE_TIMESTAMP_FORMAT)
    )
}
