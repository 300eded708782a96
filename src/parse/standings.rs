//! Standings table mapping.
//!
//! Column semantics are detected from the header row, not assumed from
//! position: the site hides and reorders columns between divisions. Each
//! semantic field declares the header substrings it accepts; the first
//! matching header cell wins and the mapping is resolved once per table.

use std::collections::HashSet;

use crate::parse::tables::RawTable;
use crate::StandingsEntry;

/// How a header cell is matched against a field.
///
/// Single-letter headers like "V" (wins) must stand alone as a word,
/// otherwise they would match inside "Visiteur".
enum Pattern {
    Substring(&'static str),
    Word(&'static str),
}

use Pattern::{Substring, Word};

const POSITION: &[Pattern] = &[Substring("pos"), Substring("rang"), Substring("rank")];
const TEAM: &[Pattern] = &[Substring("équipe"), Substring("equipe"), Substring("team")];
const PLAYED: &[Pattern] = &[Word("pj"), Word("mj"), Word("gp")];
const WINS: &[Pattern] = &[Word("v"), Word("w"), Substring("vict")];
const LOSSES: &[Pattern] = &[Word("d"), Word("l"), Substring("déf")];
const DRAWS: &[Pattern] = &[Word("n"), Word("t"), Substring("nul")];
const GOALS_FOR: &[Pattern] = &[Word("bp"), Word("pf"), Word("gf")];
const GOALS_AGAINST: &[Pattern] = &[Word("bc"), Word("pa"), Word("ga")];
const AVERAGE: &[Pattern] = &[Substring("moy"), Substring("avg"), Substring("%")];
const POINTS: &[Pattern] = &[Word("pts"), Substring("points")];

/// Resolved column indexes for one table. A `None` field means the column
/// is absent and every row gets a null value for it.
#[derive(Debug, Default)]
pub struct ColumnMap {
    position: Option<usize>,
    team: Option<usize>,
    played: Option<usize>,
    wins: Option<usize>,
    losses: Option<usize>,
    draws: Option<usize>,
    goals_for: Option<usize>,
    goals_against: Option<usize>,
    average: Option<usize>,
    points: Option<usize>,
}

impl ColumnMap {
    pub fn detect(headers: &[String]) -> Self {
        ColumnMap {
            position: find(headers, POSITION),
            team: find(headers, TEAM),
            played: find(headers, PLAYED),
            wins: find(headers, WINS),
            losses: find(headers, LOSSES),
            draws: find(headers, DRAWS),
            goals_for: find(headers, GOALS_FOR),
            goals_against: find(headers, GOALS_AGAINST),
            average: find(headers, AVERAGE),
            points: find(headers, POINTS),
        }
    }
}

fn find(headers: &[String], patterns: &[Pattern]) -> Option<usize> {
    headers
        .iter()
        .position(|header| patterns.iter().any(|p| matches(header, p)))
}

fn matches(header: &str, pattern: &Pattern) -> bool {
    let lower = header.to_lowercase();
    match pattern {
        Substring(s) => lower.contains(s),
        Word(w) => lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == *w),
    }
}

fn text_cell(row: &[String], index: Option<usize>) -> Option<String> {
    let text = index.and_then(|i| row.get(i))?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn int_cell(row: &[String], index: Option<usize>) -> Option<u32> {
    text_cell(row, index).and_then(|s| s.parse().ok())
}

/// Map one table's body rows to standings entries.
///
/// Rows without both a position and a team name are silently dropped.
/// Output is sorted by parsed position; rows whose position does not parse
/// rank after all valid rows, keeping their relative input order.
pub fn map_table(table: &RawTable) -> Vec<StandingsEntry> {
    let columns = ColumnMap::detect(&table.headers);
    let mut entries = Vec::new();

    for row in &table.rows {
        let position_text = match text_cell(row, columns.position) {
            Some(text) => text,
            None => continue,
        };
        let team = match text_cell(row, columns.team) {
            Some(text) => text,
            None => continue,
        };

        entries.push(StandingsEntry {
            position: position_text.parse().ok(),
            team,
            division: table.division.clone(),
            played: int_cell(row, columns.played),
            wins: int_cell(row, columns.wins),
            losses: int_cell(row, columns.losses),
            draws: int_cell(row, columns.draws),
            goals_for: int_cell(row, columns.goals_for),
            goals_against: int_cell(row, columns.goals_against),
            average: text_cell(row, columns.average),
            points: int_cell(row, columns.points),
        });
    }

    // Stable sort keeps input order among unranked rows.
    entries.sort_by_key(|e| e.position.map(u64::from).unwrap_or(u64::MAX));
    entries
}

/// Map every division table, dropping teams already seen in an earlier
/// division (the site repeats teams in overview tables).
pub fn map_all(tables: &[RawTable]) -> Vec<StandingsEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut all = Vec::new();

    for table in tables {
        for entry in map_table(table) {
            if seen.insert(entry.team.clone()) {
                all.push(entry);
            }
        }
    }

    log::debug!("Mapped {} standings rows across {} tables", all.len(), tables.len());
    all
}
