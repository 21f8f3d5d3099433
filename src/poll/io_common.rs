use std::path::Path;

use crate::poll::*;
use snafu::prelude::*;

/// The formats a votefile can come in.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// An explicit input type wins. Otherwise, spreadsheets are recognized by their extension
/// and everything else is read as CSV.
pub fn infer_input_type(path: &str, explicit: Option<&str>) -> PollResult<InputType> {
    match explicit.map(|s| s.to_lowercase()) {
        Some(s) if s == "csv" => Ok(InputType::Csv),
        Some(s) if s == "xlsx" => Ok(InputType::Xlsx),
        Some(s) => whatever!("Unknown input type {:?}, expected csv or xlsx", s),
        None => {
            let extension = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            match extension.as_deref() {
                Some("xlsx") => Ok(InputType::Xlsx),
                _ => Ok(InputType::Csv),
            }
        }
    }
}

/// Removes the byte order mark that spreadsheet programs put in front of CSV exports.
pub fn strip_bom(contents: &str) -> &str {
    contents.trim_start_matches('\u{feff}')
}
