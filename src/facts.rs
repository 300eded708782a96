//! Derives next/last game facts from calendar entries.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::CalendarEntry;

/// How many upcoming games are reported per target.
pub const UPCOMING_WINDOW: usize = 5;

/// Facts derived from one target's schedule.
///
/// All fields empty is a valid steady state (off-season), not an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameFacts {
    pub next: Option<CalendarEntry>,
    pub upcoming: Vec<CalendarEntry>,
    pub last: Option<CalendarEntry>,
}

/// Derive the next game, the upcoming window and the last played game
/// relative to `now`. Entries without a parseable instant are excluded
/// from all three; they can only ever be shown historically.
pub fn derive(entries: &[CalendarEntry], now: DateTime<Tz>) -> GameFacts {
    let mut dated: Vec<(DateTime<Tz>, &CalendarEntry)> = entries
        .iter()
        .filter_map(|e| e.instant.map(|i| (i, e)))
        .collect();
    dated.sort_by_key(|(instant, _)| *instant);

    let upcoming: Vec<CalendarEntry> = dated
        .iter()
        .filter(|(instant, _)| *instant >= now)
        .take(UPCOMING_WINDOW)
        .map(|(_, e)| (*e).clone())
        .collect();

    let next = upcoming.first().cloned();

    let last = dated
        .iter()
        .rev()
        .find(|(instant, e)| *instant <= now && !e.result.trim().is_empty())
        .map(|(_, e)| (*e).clone());

    GameFacts {
        next,
        upcoming,
        last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Toronto;

    fn entry(instant: Option<DateTime<Tz>>, result: &str) -> CalendarEntry {
        CalendarEntry {
            game_number: "1".to_string(),
            weekday: "Samedi".to_string(),
            date_text: "2024-10-05".to_string(),
            time_text: "19h30".to_string(),
            instant,
            visitor: "Aigles".to_string(),
            home: "Loups".to_string(),
            result: result.to_string(),
            venue: "Aréna".to_string(),
        }
    }

    fn now() -> DateTime<Tz> {
        Toronto.with_ymd_and_hms(2024, 10, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_next_and_upcoming() {
        let entries = vec![
            entry(Some(now() - Duration::days(1)), "3-2"),
            entry(Some(now() + Duration::days(2)), ""),
            entry(Some(now() + Duration::days(5)), ""),
        ];
        let facts = derive(&entries, now());
        assert_eq!(
            facts.next.as_ref().unwrap().instant,
            Some(now() + Duration::days(2))
        );
        assert_eq!(facts.upcoming.len(), 2);
        assert_eq!(facts.upcoming[1].instant, Some(now() + Duration::days(5)));
    }

    #[test]
    fn test_upcoming_window_capped_at_five() {
        let entries: Vec<CalendarEntry> = (1..=8)
            .map(|d| entry(Some(now() + Duration::days(d)), ""))
            .collect();
        let facts = derive(&entries, now());
        assert_eq!(facts.upcoming.len(), UPCOMING_WINDOW);
    }

    #[test]
    fn test_unparsable_entries_excluded() {
        let entries = vec![entry(None, ""), entry(None, "2-1")];
        let facts = derive(&entries, now());
        assert!(facts.next.is_none());
        assert!(facts.upcoming.is_empty());
        assert!(facts.last.is_none());
    }

    #[test]
    fn test_off_season_is_empty_not_error() {
        let facts = derive(&[], now());
        assert!(facts.next.is_none());
        assert!(facts.upcoming.is_empty());
        assert!(facts.last.is_none());
    }

    #[test]
    fn test_last_requires_result_text() {
        let entries = vec![
            entry(Some(now() - Duration::days(7)), "4-1"),
            // Postponed: in the past but never played.
            entry(Some(now() - Duration::days(1)), ""),
        ];
        let facts = derive(&entries, now());
        assert_eq!(
            facts.last.as_ref().unwrap().instant,
            Some(now() - Duration::days(7))
        );
    }

    #[test]
    fn test_entries_out_of_order_sorted() {
        let entries = vec![
            entry(Some(now() + Duration::days(5)), ""),
            entry(Some(now() + Duration::days(2)), ""),
        ];
        let facts = derive(&entries, now());
        assert_eq!(
            facts.next.as_ref().unwrap().instant,
            Some(now() + Duration::days(2))
        );
    }
}
