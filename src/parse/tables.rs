//! Raw table extraction.
//!
//! The league site renders one table per division plus, on some pages, a
//! global summary table that repeats every row. Tables are associated with
//! the nearest preceding text node naming a division.

use crate::{Result, RinksideError};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Label used when no division heading precedes a table.
pub const UNKNOWN_DIVISION: &str = "Division inconnue";

/// One table lifted out of the page, body rows as trimmed cell texts.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub division: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Extract every table in the document, in document order.
///
/// A table whose body exceeds `row_ceiling` rows is discarded outright: on
/// multi-division pages that always means the selector matched a summary
/// container rather than a per-division table.
pub fn extract_tables(html: &str, row_ceiling: Option<usize>) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let label_pattern = Regex::new(r"(?i)division").unwrap();

    let mut tables = Vec::new();
    let mut division = UNKNOWN_DIVISION.to_string();

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() && label_pattern.is_match(trimmed) {
                    division = trimmed.to_string();
                }
            }
            Node::Element(element) if element.name() == "table" => {
                let Some(table) = ElementRef::wrap(node) else {
                    continue;
                };
                let raw = read_table(table, &division);

                if let Some(ceiling) = row_ceiling {
                    if raw.rows.len() > ceiling {
                        log::debug!(
                            "Skipping table under '{}' ({} rows, likely a global summary)",
                            division,
                            raw.rows.len()
                        );
                        continue;
                    }
                }

                tables.push(raw);
            }
            _ => {}
        }
    }

    log::debug!("Extracted {} tables", tables.len());
    tables
}

/// Extract a single table: the one with the given element id when present,
/// otherwise the first table in the document.
///
/// Returns an extraction error when the page has no table at all; callers
/// treat this as "no data available" for the target, never as fatal.
pub fn extract_table(html: &str, id: Option<&str>) -> Result<RawTable> {
    let document = Html::parse_document(html);

    if let Some(id) = id {
        if let Ok(selector) = Selector::parse(&format!("table#{}", id)) {
            if let Some(table) = document.select(&selector).next() {
                return Ok(read_table(table, UNKNOWN_DIVISION));
            }
        }
        log::debug!("No table with id '{}', falling back to first table", id);
    }

    let any_table = Selector::parse("table").unwrap();
    document
        .select(&any_table)
        .next()
        .map(|table| read_table(table, UNKNOWN_DIVISION))
        .ok_or_else(|| RinksideError::Extraction("no table found in page".to_string()))
}

/// Read header and body cell texts out of one table element. Body rows
/// with fewer cells than the header are skipped, never a panic.
fn read_table(table: ElementRef, division: &str) -> RawTable {
    let header_selector = Selector::parse("thead th").unwrap();
    let row_selector = Selector::parse("tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let headers: Vec<String> = table
        .select(&header_selector)
        .map(|th| cell_text(&th))
        .collect();

    let mut rows = Vec::new();
    for tr in table.select(&row_selector) {
        let cells: Vec<String> = tr.select(&cell_selector).map(|td| cell_text(&td)).collect();
        if cells.is_empty() {
            continue;
        }
        if !headers.is_empty() && cells.len() < headers.len() {
            log::debug!("Skipping short row ({} of {} cells)", cells.len(), headers.len());
            continue;
        }
        rows.push(cells);
    }

    RawTable {
        division: division.to_string(),
        headers,
        rows,
    }
}

fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_html(rows: usize) -> String {
        let body: String = (0..rows)
            .map(|i| format!("<tr><td>{}</td><td>Team {}</td></tr>", i + 1, i + 1))
            .collect();
        format!(
            "<table><thead><tr><th>Pos</th><th>Équipe</th></tr></thead><tbody>{}</tbody></table>",
            body
        )
    }

    #[test]
    fn test_division_label_from_preceding_text() {
        let html = format!(
            "<html><body><h3>Division Nord</h3>{}<p>Division Sud</p>{}</body></html>",
            table_html(2),
            table_html(3)
        );
        let tables = extract_tables(&html, Some(15));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].division, "Division Nord");
        assert_eq!(tables[1].division, "Division Sud");
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[1].rows.len(), 3);
    }

    #[test]
    fn test_unknown_division_sentinel() {
        let html = format!("<html><body>{}</body></html>", table_html(1));
        let tables = extract_tables(&html, Some(15));
        assert_eq!(tables[0].division, UNKNOWN_DIVISION);
    }

    #[test]
    fn test_row_ceiling_discards_whole_table() {
        let html = format!(
            "<html><body><h3>Division Est</h3>{}{}</body></html>",
            table_html(20),
            table_html(4)
        );
        let tables = extract_tables(&html, Some(15));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 4);
    }

    #[test]
    fn test_no_ceiling_keeps_long_table() {
        let html = format!("<html><body>{}</body></html>", table_html(30));
        let tables = extract_tables(&html, None);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 30);
    }

    #[test]
    fn test_short_rows_skipped() {
        let html = "<html><body><table>\
            <thead><tr><th>Pos</th><th>Équipe</th><th>PTS</th></tr></thead>\
            <tbody>\
            <tr><td>1</td><td>Aigles</td><td>12</td></tr>\
            <tr><td>2</td></tr>\
            </tbody></table></body></html>";
        let tables = extract_tables(html, Some(15));
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[0].rows[0], vec!["1", "Aigles", "12"]);
    }

    #[test]
    fn test_cell_text_trimmed() {
        let html = "<html><body><table><tbody>\
            <tr><td>  Les <b>Aigles</b> </td></tr>\
            </tbody></table></body></html>";
        let tables = extract_tables(html, None);
        assert_eq!(tables[0].rows[0][0], "Les Aigles");
    }

    #[test]
    fn test_extract_table_by_id() {
        let html = "<html><body>\
            <table><tbody><tr><td>first</td></tr></tbody></table>\
            <table id=\"standings\"><tbody><tr><td>second</td></tr></tbody></table>\
            </body></html>";
        let by_id = extract_table(html, Some("standings")).unwrap();
        assert_eq!(by_id.rows[0][0], "second");
        // Unknown id falls back to the first table.
        let fallback = extract_table(html, Some("nonexistent")).unwrap();
        assert_eq!(fallback.rows[0][0], "first");
    }

    #[test]
    fn test_extract_table_missing_is_error() {
        let result = extract_table("<html><body><p>rien</p></body></html>", None);
        assert!(result.is_err());
    }
}
