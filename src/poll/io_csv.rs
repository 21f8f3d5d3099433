// Primitives for reading and writing CSV files.

use log::debug;
use snafu::prelude::*;

use vote_tally::registry::Registry;
use vote_tally::VoteTable;

use crate::poll::{io_common::strip_bom, *};

pub fn read_csv_votes(path: &str) -> PollResult<VoteTable> {
    let contents = read_text_file(path)?;
    parse_vote_table(&contents).context(CsvReadSnafu { path })
}

/// Reads a votefile. The first record is the header, the following ones are the votes.
/// Records may have fewer or more cells than the header.
pub fn parse_vote_table(contents: &str) -> Result<VoteTable, csv::Error> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(strip_bom(contents).as_bytes());
    let mut records = rdr.into_records();

    let header: Vec<String> = match records.next() {
        Some(r) => r?.iter().map(|s| s.to_string()).collect(),
        None => return Ok(VoteTable::default()),
    };
    debug!("parse_vote_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let line = line_r?;
        debug!("parse_vote_table: lineno: {:?} row: {:?}", idx + 2, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(VoteTable { header, rows })
}

/// Reads a codefile written by [`write_codefile`].
///
/// Lines with only two fields are read as `email,code`, with a blank organization.
pub fn read_codefile(path: &str) -> PollResult<Vec<(String, String, String)>> {
    let contents = read_text_file(path)?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(strip_bom(&contents).as_bytes());

    let mut res: Vec<(String, String, String)> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvReadSnafu { path })?;
        let fields: Vec<&str> = line.iter().collect();
        match fields.as_slice() {
            [email, organization, code] => {
                res.push((email.to_string(), organization.to_string(), code.to_string()))
            }
            [email, code] => res.push((email.to_string(), "".to_string(), code.to_string())),
            _ => whatever!(
                "Codefile {} line {}: expected email,organization,code but found {} fields",
                path,
                lineno,
                fields.len()
            ),
        }
    }
    Ok(res)
}

pub fn write_codefile(path: &str, registry: &Registry) -> PollResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvWriteSnafu { path })?;
    for (email, organization, code) in registry.emit_codefile() {
        wtr.write_record([email.as_str(), organization.as_str(), code.as_str()])
            .context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingFileSnafu { path })
}
