//! Parser for purchase transaction files.
//!
//! Format, one purchase line per row:
//! - `user,item` or `user,item,quantity`
//! - blank lines and lines starting with `#` are ignored
//! - an optional header row whose first field is `user` is skipped
//!
//! Product codes exported from spreadsheets often carry a trailing `.0`
//! (`1090011.0`); it is stripped so the same product maps to one column.

use crate::error::{DataLoadError, Result};
use crate::types::Transaction;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Reads a file as ISO-8859-1 (Latin-1).
///
/// Store exports are not guaranteed to be UTF-8. Every Latin-1 byte maps
/// directly to a Unicode code point, so this never fails on content.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Parse a transaction file from disk
pub fn parse_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let lines = read_lines_latin1(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_transaction_lines(&file_name, &lines)
}

/// Parse already-read transaction lines. `file` is only used in error messages.
pub fn parse_transaction_lines(file: &str, lines: &[String]) -> Result<Vec<Transaction>> {
    let mut transactions = Vec::new();
    let mut seen_data = false;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let mut parts = line_trimmed.split(',').map(str::trim);

        let user = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| {
            DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing user".to_string(),
            }
        })?;

        if !seen_data && user.eq_ignore_ascii_case("user") {
            seen_data = true;
            continue;
        }
        seen_data = true;

        let item = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| {
            DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing item".to_string(),
            }
        })?;

        let quantity = match parts.next() {
            Some(q) if !q.is_empty() => q.parse::<f64>().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid quantity: {}", e),
            })?,
            _ => 1.0,
        };

        if parts.next().is_some() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Too many fields".to_string(),
            });
        }

        transactions.push(Transaction {
            user: user.to_string(),
            item: normalize_code(item),
            quantity,
        });
    }

    Ok(transactions)
}

/// Strips the float suffix spreadsheets add to numeric product codes
///
/// Example: "1090011.0" -> "1090011"
///          "ABC-12" -> "ABC-12"
fn normalize_code(code: &str) -> String {
    code.strip_suffix(".0").unwrap_or(code).to_string()
}
