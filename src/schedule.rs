//! Reporting window computation.
//!
//! Reports always cover one full Sunday-to-Saturday week. Whatever day the job
//! runs on, the window is the most recent such week that has already ended:
//!
//! | Run date (weekday) | Window              |
//! |--------------------|---------------------|
//! | Sunday 2024-01-14  | 2024-01-07 .. 01-13 |
//! | Monday 2024-01-15  | 2024-01-07 .. 01-13 |
//! | Saturday 2024-01-20| 2024-01-07 .. 01-13 |

use crate::types::ReportWindow;
use chrono::{Datelike, Days, NaiveDate, NaiveTime};

/// Most recently completed Sunday..Saturday week relative to `today` (UTC)
pub fn previous_week(today: NaiveDate) -> ReportWindow {
    // Saturday is still in progress when run on a Saturday, so step back a full week
    let back_to_saturday = u64::from(today.weekday().num_days_from_sunday()) + 1;
    let saturday = today - Days::new(back_to_saturday);
    let sunday = saturday - Days::new(6);

    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    ReportWindow {
        start: sunday.and_time(NaiveTime::MIN).and_utc(),
        end: saturday.and_time(end_of_day).and_utc(),
    }
}
