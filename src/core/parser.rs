//! Extraction of tier 1 mirror rows from the mirror directory HTML.
//!
//! The page keeps its mirror table inside `#dev-mirrorlist`. Each body row
//! carries, in order: the server link, the country, the tier, the file-sync
//! ("ISO") flag and a comma separated protocol list. Missing page structure
//! is not an error and yields no records; a row that is present but short
//! of cells is.
//!
//! HTML5 parsing wraps bare table rows in an implied `<tbody>`, so the
//! tbody requirement is checked against the raw markup instead of the DOM.

use crate::domain::model::MirrorRecord;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const MIRROR_LIST_ID: &str = "dev-mirrorlist";

const CELLS_PER_ROW: usize = 5;
const FILE_SYNC_YES: &str = "YES";

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#dev-mirrorlist").expect("valid container selector"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static TBODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody").expect("valid tbody selector"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid link selector"));
static CONTAINER_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*["']?dev-mirrorlist\b"#).expect("valid container pattern")
});

/// Parses the tier 1 page into the mirrors that support file sync.
pub fn parse_tier1_list(html: &str) -> Result<Vec<MirrorRecord>> {
    if html.trim().is_empty() {
        tracing::debug!("Tier 1 document is empty, no mirrors to parse");
        return Ok(Vec::new());
    }

    let document = Html::parse_document(html);

    let Some(container) = document.select(&CONTAINER).next() else {
        tracing::warn!("No #{} element in tier 1 document", MIRROR_LIST_ID);
        return Ok(Vec::new());
    };

    let Some(tbody) = container
        .select(&TABLE)
        .next()
        .and_then(|table| table.select(&TBODY).next())
    else {
        tracing::warn!("No mirror table body inside #{}", MIRROR_LIST_ID);
        return Ok(Vec::new());
    };

    if !has_explicit_tbody(html) {
        tracing::warn!("Mirror table inside #{} has no <tbody>", MIRROR_LIST_ID);
        return Ok(Vec::new());
    }

    let mut mirrors = Vec::new();
    for (row_index, row) in child_elements(tbody, "tr").enumerate() {
        if let Some(record) = parse_row(row_index, row)? {
            mirrors.push(record);
        }
    }

    tracing::debug!("Parsed {} file-sync capable tier 1 mirrors", mirrors.len());
    Ok(mirrors)
}

fn parse_row(row_index: usize, row: ElementRef<'_>) -> Result<Option<MirrorRecord>> {
    let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
    if cells.len() < CELLS_PER_ROW {
        return Err(EtlError::MalformedRecordError {
            row: row_index,
            reason: format!("expected {} cells, found {}", CELLS_PER_ROW, cells.len()),
        });
    }

    let file_sync = cell_text(cells[3]);
    if file_sync != FILE_SYNC_YES {
        tracing::debug!("Skipping row {}: file sync flag is '{}'", row_index, file_sync);
        return Ok(None);
    }

    let domain = cells[0]
        .select(&LINK)
        .next()
        .map(cell_text)
        .ok_or_else(|| EtlError::MalformedRecordError {
            row: row_index,
            reason: "first cell has no server link".to_string(),
        })?;
    if domain.is_empty() {
        return Err(EtlError::MalformedRecordError {
            row: row_index,
            reason: "server link text is empty".to_string(),
        });
    }

    let protocols: BTreeSet<String> = cell_text(cells[4])
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    if protocols.is_empty() {
        return Err(EtlError::MalformedRecordError {
            row: row_index,
            reason: format!("mirror {} lists no protocols", domain),
        });
    }

    Ok(Some(MirrorRecord {
        domain,
        country: cell_text(cells[1]),
        tier: cell_text(cells[2]),
        supports_file_sync: true,
        protocols,
    }))
}

/// Whether the source markup spells out a `<tbody>` in the first table
/// after the container's opening tag.
fn has_explicit_tbody(html: &str) -> bool {
    let Some(found) = CONTAINER_ATTR.find(html) else {
        return false;
    };
    let rest = html[found.end()..].to_ascii_lowercase();
    let Some(table_start) = rest.find("<table") else {
        return false;
    };
    let table = &rest[table_start..];
    let table_end = table.find("</table").unwrap_or(table.len());
    table[..table_end].contains("<tbody")
}

/// Element children of `parent` with the given tag name, skipping
/// anything nested deeper (e.g. a table inside a cell).
fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
<div id="dev-mirrorlist">
  <table class="results">
    <thead><tr><th>Server</th><th>Country</th><th>Tier</th><th>ISOs</th><th>Protocols</th></tr></thead>
    <tbody>{}</tbody>
  </table>
</div>
</body></html>"#,
            rows
        )
    }

    fn row(domain: &str, country: &str, tier: &str, iso: &str, protocols: &str) -> String {
        format!(
            r#"<tr><td><a href="/mirrors/{0}/">{0}</a></td><td>{1}</td><td>{2}</td><td>{3}</td><td>{4}</td></tr>"#,
            domain, country, tier, iso, protocols
        )
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_tier1_list("").unwrap().is_empty());
        assert!(parse_tier1_list("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_without_container() {
        let html = "<html><body><table><tbody><tr><td>x</td></tr></tbody></table></body></html>";
        assert!(parse_tier1_list(html).unwrap().is_empty());
    }

    #[test]
    fn test_parse_container_without_table() {
        let html = r#"<html><body><div id="dev-mirrorlist"><p>No mirrors</p></div></body></html>"#;
        assert!(parse_tier1_list(html).unwrap().is_empty());
    }

    #[test]
    fn test_parse_trims_and_splits_fields() {
        let html = page(&row("example.org", "  Germany ", "1", "YES", "https, rsync"));

        let mirrors = parse_tier1_list(&html).unwrap();

        assert_eq!(mirrors.len(), 1);
        let mirror = &mirrors[0];
        assert_eq!(mirror.domain, "example.org");
        assert_eq!(mirror.country, "Germany");
        assert_eq!(mirror.tier, "1");
        assert!(mirror.supports_file_sync);
        let expected: BTreeSet<String> = ["https", "rsync"].iter().map(|p| p.to_string()).collect();
        assert_eq!(mirror.protocols, expected);
    }

    #[test]
    fn test_parse_skips_rows_without_file_sync() {
        let rows = [
            row("kept.example.org", "France", "1", "YES", "http"),
            row("skipped.example.org", "France", "1", "NO", "http, https"),
            row("also-kept.example.net", "Sweden", "1", " YES ", "rsync"),
        ]
        .concat();

        let mirrors = parse_tier1_list(&page(&rows)).unwrap();

        let domains: Vec<&str> = mirrors.iter().map(|m| m.domain.as_str()).collect();
        assert_eq!(domains, vec!["kept.example.org", "also-kept.example.net"]);
    }

    #[test]
    fn test_parse_nested_country_markup() {
        let html = page(
            r#"<tr><td><a href="/m/">example.org</a></td><td><span class="fam-flag fam-flag-de"></span> Germany</td><td>1</td><td>YES</td><td>https</td></tr>"#,
        );

        let mirrors = parse_tier1_list(&html).unwrap();
        assert_eq!(mirrors[0].country, "Germany");
    }

    #[test]
    fn test_parse_short_row_is_malformed() {
        let rows = [
            row("ok.example.org", "Germany", "1", "YES", "https"),
            "<tr><td><a href=\"/m/\">short.example.org</a></td><td>Germany</td></tr>".to_string(),
        ]
        .concat();

        let err = parse_tier1_list(&page(&rows)).unwrap_err();
        match err {
            EtlError::MalformedRecordError { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("found 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_table_without_tbody() {
        let html = format!(
            r#"<html><body><div id="dev-mirrorlist"><table>{}</table></div></body></html>"#,
            row("example.org", "Germany", "1", "YES", "https")
        );
        assert!(parse_tier1_list(&html).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tbody_detection_ignores_later_tables() {
        let html = format!(
            r#"<html><body><div id='dev-mirrorlist'><table>{}</table></div>
<table><tbody><tr><td>unrelated</td></tr></tbody></table></body></html>"#,
            row("example.org", "Germany", "1", "YES", "https")
        );
        assert!(parse_tier1_list(&html).unwrap().is_empty());
    }

    #[test]
    fn test_parse_uppercase_tbody() {
        let html = format!(
            r#"<HTML><BODY><DIV ID="dev-mirrorlist"><TABLE><TBODY>{}</TBODY></TABLE></DIV></BODY></HTML>"#,
            row("example.org", "Germany", "1", "YES", "https")
        );
        assert_eq!(parse_tier1_list(&html).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_nested_table_in_cell_keeps_positions() {
        let html = page(
            r#"<tr><td><a href="/m/">example.org</a><table><tbody><tr><td>x</td><td>y</td></tr></tbody></table></td><td>Germany</td><td>1</td><td>YES</td><td>https, rsync</td></tr>"#,
        );

        let mirrors = parse_tier1_list(&html).unwrap();

        assert_eq!(mirrors.len(), 1);
        assert_eq!(mirrors[0].country, "Germany");
        assert_eq!(mirrors[0].tier, "1");
        assert_eq!(mirrors[0].protocols.len(), 2);
    }

    #[test]
    fn test_parse_missing_link_is_malformed() {
        let html = page("<tr><td>example.org</td><td>Germany</td><td>1</td><td>YES</td><td>https</td></tr>");

        let err = parse_tier1_list(&html).unwrap_err();
        assert!(matches!(err, EtlError::MalformedRecordError { row: 0, .. }));
    }

    #[test]
    fn test_parse_empty_protocol_list_is_malformed() {
        let html = page(&row("example.org", "Germany", "1", "YES", " , "));

        let err = parse_tier1_list(&html).unwrap_err();
        assert!(matches!(err, EtlError::MalformedRecordError { row: 0, .. }));
    }
}
