use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use vote_tally::aggregate::{summarize, PollSummary};
use vote_tally::answer_key::AnswerKey;
use vote_tally::registry::{RegisterOutcome, Registry, RegistryBuilder};
use vote_tally::*;

use crate::poll::config_reader::PollSettings;
use crate::poll::io_common::*;
use crate::poll::io_emails::EmailInput;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_emails;
mod io_xlsx;
pub mod report;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PollError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV file {path}"))]
    CsvRead { source: csv::Error, path: String },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Cannot read option {field} as a number"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("{source}"))]
    Tally { source: TallyError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl PollError {
    /// The process exit status for this error. Each fatal integrity problem has its own.
    pub fn exit_code(&self) -> i32 {
        match self {
            PollError::Tally { source } => match source {
                TallyError::CodeCollision { .. } => 2,
                TallyError::InvalidVoterCode { .. } => 3,
                TallyError::MissingVoterCodeColumn { .. } => 4,
                TallyError::MalformedAnswerKey { .. } => 5,
                TallyError::InvalidCodeLength(_) | TallyError::InvalidRankThreshold(_) => 1,
            },
            PollError::ParsingJson { .. }
            | PollError::ParsingJsonNumber { .. }
            | PollError::Whatever { .. } => 1,
            _ => 6,
        }
    }
}

pub type PollResult<T> = Result<T, PollError>;

fn register_input(builder: &mut RegistryBuilder, input: &EmailInput) -> PollResult<()> {
    match input {
        EmailInput::Tabular(rows) => {
            for (email, organization) in rows.iter() {
                let outcome = builder.add_email(email, organization).context(TallySnafu)?;
                debug!("register_input: {:?} -> {:?}", email, outcome);
            }
        }
        EmailInput::Lines(lines) => {
            for line in lines.iter() {
                let outcome = builder.add_line(line).context(TallySnafu)?;
                debug!("register_input: {:?} -> {:?}", line, outcome);
            }
        }
    }
    Ok(())
}

/// Builds the registry from a previous codefile and from the email files, in this order.
pub fn build_registry(settings: &PollSettings) -> PollResult<Registry> {
    let mut builder = RegistryBuilder::new(&settings.name, settings.code_length).context(TallySnafu)?;

    if let Some(path) = &settings.load_codes {
        println!("==> Loading voter codes from \"{}\"", path);
        let entries = io_csv::read_codefile(path)?;
        let mut restored = 0;
        for (email, organization, code) in entries.iter() {
            if let RegisterOutcome::Valid(_) = builder
                .restore(email, organization, code)
                .context(TallySnafu)?
            {
                restored += 1;
            }
        }
        println!("{:4} voter codes loaded\n", restored);
    }

    for path in settings.email_files.iter() {
        println!("==> Reading email file \"{}\"", path);
        let before = builder.stats();
        let input = io_emails::read_email_file(
            path,
            &settings.email_column,
            &settings.organization_column,
        )?;
        if let EmailInput::Tabular(_) = input {
            info!(
                "Reading {} as a table with column {:?}",
                simplify_file_name(path),
                settings.email_column
            );
        }
        register_input(&mut builder, &input)?;
        let after = builder.stats();
        println!(
            "{:4} valid, {:4} duplicate, {:4} skipped lines, salted as \"{}\"\n",
            after.valid - before.valid,
            after.duplicate - before.duplicate,
            after.skipped - before.skipped,
            settings.name
        );
    }
    Ok(builder.build())
}

fn read_votes(settings: &PollSettings, path: &str) -> PollResult<VoteTable> {
    println!("==> Reading votes from \"{}\"", path);
    match infer_input_type(path, settings.input_type.as_deref())? {
        InputType::Csv => io_csv::read_csv_votes(path),
        InputType::Xlsx => io_xlsx::read_xlsx_votes(path),
    }
}

/// Runs all the stages requested by the settings.
pub fn run_poll(settings: &PollSettings) -> PollResult<()> {
    info!("settings: {:?}", settings);

    if settings.email_files.is_empty() && settings.load_codes.is_none() {
        whatever!("No voters: provide at least one email file or a codefile to load");
    }
    if settings.votefile.is_none() && (settings.resultfile.is_some() || settings.winfile.is_some())
    {
        whatever!("A votefile is required to generate results");
    }

    let registry = build_registry(settings)?;

    if let Some(path) = &settings.codefile {
        println!("==> Generating code file \"{}\"", path);
        if settings.debug {
            for (email, organization, code) in registry.emit_codefile() {
                debug!("{} : {} {}", code, email, organization);
            }
            debug!("{} voters", registry.len());
        }
        io_csv::write_codefile(path, &registry)?;
        println!("{} voter codes written\n", registry.len());
    }

    let votefile = match &settings.votefile {
        Some(path) => path,
        None => return Ok(()),
    };

    let answer_key = match &settings.answerkey {
        Some(path) => {
            println!("==> Reading answer key \"{}\"", path);
            let contents = read_text_file(path)?;
            let key = AnswerKey::load(&contents).context(TallySnafu)?;
            println!("{} quiz questions\n", key.len());
            Some(key)
        }
        None => None,
    };

    let table = read_votes(settings, votefile)?;
    let tally = tally_votes(&table, &registry, answer_key.as_ref(), &settings.rules)
        .context(TallySnafu)?;
    println!(
        "Read {} records resulting in {} unique, {} valid votes\n",
        tally.record_count,
        tally.unique_count,
        tally.valid_count()
    );
    if !tally.rogue_codes.is_empty() {
        warn!("{} rogue voter codes discarded", tally.rogue_codes.len());
    }

    let summary: PollSummary = summarize(&tally, &registry, settings.rules.rank_threshold);
    let generated_on = chrono::Local::now().to_string();

    let result_report = report::format_result_report(&settings.name, &generated_on, &summary, &tally);
    match &settings.resultfile {
        Some(path) => {
            println!("==> Generating result into \"{}\"", path);
            write_text_file(path, &result_report)?;
            println!(
                "Wrote results to {} questions based on {} valid voters. {} rogue voters discarded.\n",
                summary.questions.len(),
                tally.valid_count(),
                tally.rogue_codes.len()
            );
        }
        None => println!("{}", result_report),
    }

    if let Some(path) = &settings.winfile {
        println!("==> Generating ranking into \"{}\"", path);
        let win_report = report::format_win_report(&settings.name, &summary);
        write_text_file(path, &win_report)?;
    }

    Ok(())
}

pub(crate) fn read_text_file(path: &str) -> PollResult<String> {
    fs::read_to_string(path).context(OpeningFileSnafu { path })
}

pub(crate) fn write_text_file(path: &str, contents: &str) -> PollResult<()> {
    fs::write(path, contents).context(WritingFileSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::io_csv::parse_vote_table;
    use crate::poll::io_emails::sniff_email_input;

    fn registry_from(contents: &str) -> Registry {
        let mut builder = RegistryBuilder::new("fav-color", 12).unwrap();
        let input = sniff_email_input(contents, "email", "organization");
        register_input(&mut builder, &input).unwrap();
        builder.build()
    }

    #[test]
    fn red_blue_end_to_end() {
        let registry = registry_from("anna@example.org\nbob@example.org\ncarol@example.org\n");
        assert_eq!(registry.len(), 3);
        let codes: Vec<String> = registry
            .records()
            .iter()
            .map(|r| r.code.as_str().to_string())
            .collect();

        let votes = format!(
            "#,Favorite color?,voterid\n1,Blue,{}\n2,Red,{}\n3,Blue,{}\n4,Red,badc0de00000\n5,Red,{}\n",
            codes[0], codes[1], codes[2], codes[0]
        );
        let table = parse_vote_table(&votes).unwrap();
        let tally = tally_votes(&table, &registry, None, &TallyRules::default()).unwrap();
        let summary = summarize(&tally, &registry, 6);
        let text = report::format_result_report("fav-color", "today", &summary, &tally);

        assert!(text.contains("1. Question \"Favorite color?\", total votes 3, scored: no"));
        assert!(text.contains("  Red: 2 / 3 =  66.67%"));
        assert!(text.contains("  Blue: 1 / 3 =  33.33%"));
        assert!(text.contains("  Winner: Red"));
        assert!(text.contains("Total discarded voterids: 1, ids: badc0de00000"));
    }

    #[test]
    fn tabular_emails_with_organizations() {
        let registry = registry_from("Name,Email,Organization\nAnna,anna@x.org,acme\nBob,,acme\nCarol,carol@x.org,\n");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.records()[0].organization, "ACME");
        assert_eq!(registry.records()[1].organization, "");
        assert_eq!(registry.stats().skipped, 1);
    }

    #[test]
    fn exit_codes_per_cause() {
        let err = PollError::Tally {
            source: TallyError::MissingVoterCodeColumn {
                column: "voterid".to_string(),
            },
        };
        assert_eq!(err.exit_code(), 4);
        let err = PollError::EmptyExcel {
            path: "votes.xlsx".to_string(),
        };
        assert_eq!(err.exit_code(), 6);
        let err = PollError::Tally {
            source: TallyError::InvalidRankThreshold(0),
        };
        assert_eq!(err.exit_code(), 1);
    }
}
