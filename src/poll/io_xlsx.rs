use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use vote_tally::VoteTable;

use crate::poll::*;

/// Reads the votes from the first worksheet of a workbook. The first row is the header.
pub fn read_xlsx_votes(path: &str) -> PollResult<VoteTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(read_cell).collect(),
        None => return Ok(VoteTable::default()),
    };
    debug!("read_xlsx_votes: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<String> = row.iter().map(read_cell).collect();
        debug!("read_xlsx_votes: idx: {:?} row: {:?}", idx, cells);
        rows.push(cells);
    }
    Ok(VoteTable { header, rows })
}

// Whole numbers are written without decimals so that they are recognized as scores.
fn read_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => read_number(*f),
        // Dates are kept as the spreadsheet serial number.
        DataType::DateTime(f) => read_number(*f),
        DataType::Bool(b) => b.to_string(),
        DataType::Error(e) => format!("{:?}", e),
    }
}
