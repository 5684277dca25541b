//! System date and time stamps in the formats journey data is compared
//! against.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

/// Today's local date as `MM/DD/YYYY`
#[must_use]
pub fn capture_system_date() -> String {
    format_date(Local::now().date_naive())
}

/// The local time as `hh:m:s AM|PM`
#[must_use]
pub fn capture_system_time() -> String {
    format_time(Local::now().time())
}

/// Format a date as `MM/DD/YYYY`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Format a time on a 12-hour clock.
///
/// The hour is zero-padded; minutes and seconds are not.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{hour:02}:{}:{} {}",
        time.minute(),
        time.second(),
        if pm { "PM" } else { "AM" }
    )
}
