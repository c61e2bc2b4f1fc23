//! Bulk device import from a CSV upload.

use axum::{body::Bytes, extract::State, Json};
use domain::models::{ImportReport, TabularSheet};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::middleware::metrics::record_import;

/// Imports devices into the active hotel. The body is the raw CSV text; `,`, `;`
/// and tab separated files are accepted.
///
/// Row-level problems do not fail the request, they come back in the report.
///
/// POST /api/v1/devices/import
pub async fn import_devices(
    State(state): State<AppState>,
    session: AuthSession,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| ApiError::validation("the CSV file must be UTF-8 encoded"))?;
    let sheet = parse_csv(text);
    if sheet.rows.is_empty() {
        return Err(ApiError::validation("the CSV file is empty"));
    }

    let report = state.services.import.import(&session, &sheet).await?;
    record_import(&report);

    tracing::info!(
        principal_id = %session.principal_id(),
        rows = sheet.data_row_count(),
        created = report.created,
        updated = report.updated,
        errors = report.errors.len(),
        "Device import finished"
    );
    Ok(Json(report))
}

/// Picks the separator that occurs most often in the header line.
fn detect_delimiter(text: &str) -> char {
    let header = text.lines().next().unwrap_or_default();
    let mut best = (',', 0);
    for candidate in [',', ';', '\t'] {
        let count = header.matches(candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Splits CSV text into rows of cells. Quoted cells may contain separators,
/// line breaks and doubled quotes. Trailing blank lines are dropped; interior
/// ones are kept so row numbers match the spreadsheet.
pub fn parse_csv(text: &str) -> TabularSheet {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = detect_delimiter(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                field_started = false;
            }
            c if c == delimiter => {
                row.push(std::mem::take(&mut field));
                field_started = false;
            }
            c => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if field_started || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    while rows
        .last()
        .is_some_and(|r| r.iter().all(|cell| cell.trim().is_empty()))
    {
        rows.pop();
    }

    TabularSheet::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_simple_comma_file() {
        let sheet = parse_csv("Nombre,Serie\nPC-1,SN1\nPC-2,SN2\n");
        assert_eq!(
            sheet.rows,
            cells(&[&["Nombre", "Serie"], &["PC-1", "SN1"], &["PC-2", "SN2"]])
        );
    }

    #[test]
    fn test_parse_semicolon_and_crlf() {
        let sheet = parse_csv("Nombre;Marca\r\nImpresora;HP\r\n");
        assert_eq!(sheet.rows, cells(&[&["Nombre", "Marca"], &["Impresora", "HP"]]));
    }

    #[test]
    fn test_parse_quoted_cells() {
        let text = "Nombre,Notas\n\"Switch, lobby\",\"dice \"\"hola\"\"\nsegunda línea\"\n";
        let sheet = parse_csv(text);
        assert_eq!(sheet.rows[1][0], "Switch, lobby");
        assert_eq!(sheet.rows[1][1], "dice \"hola\"\nsegunda línea");
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_parse_strips_bom_and_trailing_blank_lines() {
        let sheet = parse_csv("\u{feff}Nombre\nPC-1\n\n,\n");
        assert_eq!(sheet.rows, cells(&[&["Nombre"], &["PC-1"]]));
    }

    #[test]
    fn test_interior_blank_line_keeps_numbering() {
        let sheet = parse_csv("Nombre\nPC-1\n\nPC-3");
        let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }

    #[test]
    fn test_empty_trailing_cell_is_kept() {
        let sheet = parse_csv("Nombre,Serie\nPC-1,\n");
        assert_eq!(sheet.rows[1], vec!["PC-1".to_string(), String::new()]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1,5;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb"), '\t');
        assert_eq!(detect_delimiter("nombre"), ',');
    }
}
