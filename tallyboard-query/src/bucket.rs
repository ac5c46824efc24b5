// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Calendar bucket alignment
//!
//! Buckets are labelled by their first day:
//!
//! - **Day**: the date itself
//! - **Week**: the Monday on or before the date (ISO weeks)
//! - **Month**: the first of the month

use chrono::{Datelike, Days, NaiveDate};
use tallyboard_core::Frequency;

/// Align a date to the start of its bucket
pub fn bucket_start(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => date,
        Frequency::Week => {
            let offset = date.weekday().num_days_from_monday() as u64;
            date.checked_sub_days(Days::new(offset)).unwrap_or(date)
        }
        Frequency::Month => date.with_day(1).unwrap_or(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_is_identity() {
        assert_eq!(bucket_start(date(2024, 2, 29), Frequency::Day), date(2024, 2, 29));
    }

    #[test]
    fn test_week_anchors_on_monday() {
        // 2024-01-01 is a Monday
        assert_eq!(bucket_start(date(2024, 1, 1), Frequency::Week), date(2024, 1, 1));
        assert_eq!(bucket_start(date(2024, 1, 2), Frequency::Week), date(2024, 1, 1));
        // Sunday closes the Monday-started week
        assert_eq!(bucket_start(date(2024, 1, 7), Frequency::Week), date(2024, 1, 1));
        assert_eq!(bucket_start(date(2024, 1, 8), Frequency::Week), date(2024, 1, 8));
    }

    #[test]
    fn test_week_crosses_month_and_year() {
        // 2025-01-01 is a Wednesday
        assert_eq!(bucket_start(date(2025, 1, 1), Frequency::Week), date(2024, 12, 30));
    }

    #[test]
    fn test_week_start_is_always_monday() {
        let mut day = date(2023, 12, 1);
        for _ in 0..120 {
            let start = bucket_start(day, Frequency::Week);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert!(start <= day);
            assert!((day - start).num_days() < 7);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_month_start() {
        assert_eq!(bucket_start(date(2024, 3, 31), Frequency::Month), date(2024, 3, 1));
        assert_eq!(bucket_start(date(2024, 3, 1), Frequency::Month), date(2024, 3, 1));
    }
}
