// Reading the lists of voters.

use log::debug;

use crate::poll::{io_common::strip_bom, *};

/// The two accepted layouts of an email file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum EmailInput {
    /// (email, organization) pairs read from a table with a header row.
    Tabular(Vec<(String, String)>),
    /// Free text, one address per line.
    Lines(Vec<String>),
}

pub fn read_email_file(
    path: &str,
    email_column: &str,
    organization_column: &str,
) -> PollResult<EmailInput> {
    let contents = read_text_file(path)?;
    Ok(sniff_email_input(&contents, email_column, organization_column))
}

/// Reads the content as a table if its first row names the email column, and as a list of
/// lines otherwise. Column names are compared without regard to case.
pub fn sniff_email_input(contents: &str, email_column: &str, organization_column: &str) -> EmailInput {
    let contents = strip_bom(contents);
    match read_tabular(contents, email_column, organization_column) {
        Some(rows) => EmailInput::Tabular(rows),
        None => EmailInput::Lines(contents.lines().map(|s| s.to_string()).collect()),
    }
}

fn read_tabular(
    contents: &str,
    email_column: &str,
    organization_column: &str,
) -> Option<Vec<(String, String)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let header = rdr.headers().ok()?.clone();
    let find = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    };
    let email_idx = find(email_column)?;
    let org_idx = find(organization_column);
    debug!(
        "read_tabular: email column {:?}, organization column {:?}",
        email_idx, org_idx
    );

    let mut rows: Vec<(String, String)> = Vec::new();
    for (lineno, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!("read_tabular: line {} is not tabular: {}", lineno + 2, e);
                return None;
            }
        };
        let email = record.get(email_idx).unwrap_or("").to_string();
        let organization = org_idx
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
            .to_string();
        rows.push((email, organization));
    }
    Some(rows)
}
