//! Locale-variant date/time normalization.
//!
//! The league publishes dates as ISO or day-first strings and times like
//! "19h30" or "19h". Everything is resolved against one configured zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

/// Format priority is deliberate: ISO wins over day-first for ambiguous
/// input, matching how the source renders already-normalized dates.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parses raw schedule date/time text into a zone-aware instant.
pub struct DateTimeNormalizer {
    zone: Tz,
    hour_pattern: Regex,
}

impl DateTimeNormalizer {
    pub fn new(zone: Tz) -> Self {
        DateTimeNormalizer {
            zone,
            hour_pattern: Regex::new(r"^(\d{1,2})[hH](\d{2})?$").unwrap(),
        }
    }

    /// Parse `date_text` plus optional `time_text` into an instant in the
    /// configured zone. Returns `None` on total parse failure, never errors.
    pub fn normalize(&self, date_text: &str, time_text: &str) -> Option<DateTime<Tz>> {
        let date = date_text.trim();
        if date.is_empty() {
            return None;
        }
        let time = self.clean_time(time_text.trim());

        if !time.is_empty() {
            let combined = format!("{} {}", date, time);

            // Already-zoned input gets converted rather than re-assigned.
            if let Ok(parsed) = DateTime::parse_from_rfc3339(&combined) {
                return Some(parsed.with_timezone(&self.zone));
            }

            for format in DATE_TIME_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(&combined, format) {
                    if let Some(instant) = self.localize(naive) {
                        return Some(instant);
                    }
                }
            }
            // Fall through: retry as date-only before giving up.
        }

        for format in DATE_FORMATS {
            if let Ok(parsed) = NaiveDate::parse_from_str(date, format) {
                let naive = parsed.and_hms_opt(0, 0, 0)?;
                if let Some(instant) = self.localize(naive) {
                    return Some(instant);
                }
            }
        }

        None
    }

    /// "19h30" → "19:30", "19h" → "19:00"; anything else passes through.
    fn clean_time(&self, time: &str) -> String {
        match self.hour_pattern.captures(time) {
            Some(caps) => {
                let hour = &caps[1];
                let minutes = caps.get(2).map(|m| m.as_str()).unwrap_or("00");
                format!("{}:{}", hour, minutes)
            }
            None => time.to_string(),
        }
    }

    /// Assign the configured zone to a naive value. Ambiguous wall-clock
    /// times (DST fall-back) resolve to the earlier instant; nonexistent
    /// ones (spring-forward gap) yield None.
    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
        self.zone.from_local_datetime(&naive).earliest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::Toronto;

    fn normalizer() -> DateTimeNormalizer {
        DateTimeNormalizer::new(Toronto)
    }

    #[test]
    fn test_iso_date_with_h_separator() {
        let instant = normalizer().normalize("2024-10-05", "19h30").unwrap();
        assert_eq!(instant.hour(), 19);
        assert_eq!(instant.minute(), 30);
        assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
        assert_eq!(instant.timezone(), Toronto);
    }

    #[test]
    fn test_bare_hour_expands_to_full_hour() {
        let instant = normalizer().normalize("2024-10-05", "19h").unwrap();
        assert_eq!(instant.hour(), 19);
        assert_eq!(instant.minute(), 0);
    }

    #[test]
    fn test_colon_time_passes_through() {
        let instant = normalizer().normalize("2024-10-05", "19:30").unwrap();
        assert_eq!(instant.hour(), 19);
        assert_eq!(instant.minute(), 30);
    }

    #[test]
    fn test_day_first_formats() {
        let n = normalizer();
        let slash = n.normalize("05/10/2024", "19h30").unwrap();
        let dash = n.normalize("05-10-2024", "19h30").unwrap();
        assert_eq!(slash.date_naive(), NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
        assert_eq!(dash.date_naive(), NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
    }

    #[test]
    fn test_iso_wins_over_day_first() {
        // "2024-10-05" must never read as day-first.
        let instant = normalizer().normalize("2024-10-05", "").unwrap();
        assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
    }

    #[test]
    fn test_unparsable_time_falls_back_to_date_only() {
        let instant = normalizer().normalize("2024-10-05", "à confirmer").unwrap();
        assert_eq!(instant.hour(), 0);
        assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
    }

    #[test]
    fn test_total_failure_is_none() {
        assert!(normalizer().normalize("not-a-date", "").is_none());
        assert!(normalizer().normalize("", "19h30").is_none());
    }

    #[test]
    fn test_zone_is_assigned_not_converted() {
        // 19:30 wall clock in Toronto is 23:30 UTC during EDT.
        let instant = normalizer().normalize("2024-10-05", "19h30").unwrap();
        assert_eq!(instant.with_timezone(&chrono::Utc).hour(), 23);
    }
}
