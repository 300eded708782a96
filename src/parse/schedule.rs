//! Schedule table mapping.
//!
//! Unlike standings, the schedule table has a stable physical layout, so
//! columns are positional: game number, weekday, date, time, visitor,
//! result, home, then an optional map-link cell before the venue.

use chrono_tz::Tz;

use crate::parse::datetime::DateTimeNormalizer;
use crate::CalendarEntry;

const COL_GAME: usize = 0;
const COL_WEEKDAY: usize = 1;
const COL_DATE: usize = 2;
const COL_TIME: usize = 3;
const COL_VISITOR: usize = 4;
const COL_RESULT: usize = 5;
const COL_HOME: usize = 6;

/// Minimum cells for a usable schedule row (through the home column).
const MIN_COLUMNS: usize = 7;

/// With the optional map-link cell present the venue shifts one column.
const COL_VENUE_WITH_MAP: usize = 8;
const COL_VENUE: usize = 7;

pub struct ScheduleMapper {
    normalizer: DateTimeNormalizer,
}

impl ScheduleMapper {
    pub fn new(zone: Tz) -> Self {
        ScheduleMapper {
            normalizer: DateTimeNormalizer::new(zone),
        }
    }

    /// Map body rows to calendar entries; rows with too few cells are dropped.
    pub fn map_rows(&self, rows: &[Vec<String>]) -> Vec<CalendarEntry> {
        rows.iter().filter_map(|row| self.map_row(row)).collect()
    }

    fn map_row(&self, cells: &[String]) -> Option<CalendarEntry> {
        if cells.len() < MIN_COLUMNS {
            log::debug!("Skipping schedule row with {} cells", cells.len());
            return None;
        }

        let venue_index = if cells.len() > COL_VENUE_WITH_MAP {
            COL_VENUE_WITH_MAP
        } else {
            COL_VENUE
        };

        let date_text = cells[COL_DATE].clone();
        let time_text = cells[COL_TIME].clone();
        let instant = self.normalizer.normalize(&date_text, &time_text);

        Some(CalendarEntry {
            game_number: cells[COL_GAME].clone(),
            weekday: cells[COL_WEEKDAY].clone(),
            date_text,
            time_text,
            instant,
            visitor: cells[COL_VISITOR].clone(),
            result: cells[COL_RESULT].clone(),
            home: cells[COL_HOME].clone(),
            venue: cells.get(venue_index).cloned().unwrap_or_default(),
        })
    }
}
