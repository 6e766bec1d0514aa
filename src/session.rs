// =============================================================================
// Session Label: which trading session a report belongs to
// =============================================================================
//
// Local-hour windows are checked in order, nearest market open first:
//   Asia    Manila   07:00–11:59
//   Europe  London   07:00–11:59
//   US      New York 08:00–12:59
// Outside every window, fall back to UTC bands:
//   23:00–04:59 Asia, 05:00–10:59 Europe, otherwise US.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::{America::New_York, Asia::Manila, Europe::London};

use crate::types::Session;

pub fn session_label(now: DateTime<Utc>) -> Session {
    let manila = now.with_timezone(&Manila).hour();
    let london = now.with_timezone(&London).hour();
    let new_york = now.with_timezone(&New_York).hour();

    if (7..=11).contains(&manila) {
        return Session::Asia;
    }
    if (7..=11).contains(&london) {
        return Session::Europe;
    }
    if (8..=12).contains(&new_york) {
        return Session::Us;
    }

    match now.hour() {
        h if h >= 23 || h < 5 => Session::Asia,
        5..=10 => Session::Europe,
        _ => Session::Us,
    }
}
