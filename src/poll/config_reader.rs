use crate::args::Args;
use crate::poll::*;

use log::debug;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use serde_json::Value as JSValue;

use vote_tally::anonymizer::check_code_length;
use vote_tally::{
    TallyRules, DEFAULT_CODE_LENGTH, DEFAULT_RANK_THRESHOLD, DEFAULT_RESERVED_COLUMNS,
    DEFAULT_VOTER_CODE_COLUMN,
};

pub const DEFAULT_EMAIL_COLUMN: &str = "email";
pub const DEFAULT_ORGANIZATION_COLUMN: &str = "organization";

/// The optional JSON configuration file. Every field may be omitted.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(rename = "voteName")]
    pub vote_name: Option<String>,
    #[serde(rename = "emailFiles")]
    pub email_files: Option<Vec<String>>,
    #[serde(rename = "voterCodeColumn")]
    pub voter_code_column: Option<String>,
    #[serde(rename = "emailColumn")]
    pub email_column: Option<String>,
    #[serde(rename = "organizationColumn")]
    pub organization_column: Option<String>,
    #[serde(rename = "reservedColumns")]
    pub reserved_columns: Option<Vec<String>>,
    #[serde(rename = "rankThreshold")]
    _rank_threshold: Option<JSValue>,
    #[serde(rename = "codeLength")]
    _code_length: Option<JSValue>,
}

impl PollConfig {
    pub fn rank_threshold(&self) -> PollResult<Option<u32>> {
        match read_js_int(&self._rank_threshold, "rankThreshold")? {
            None => Ok(None),
            Some(x) => u32::try_from(x)
                .ok()
                .map(Some)
                .context(ParsingJsonNumberSnafu {
                    field: "rankThreshold",
                }),
        }
    }

    pub fn code_length(&self) -> PollResult<Option<usize>> {
        read_js_int(&self._code_length, "codeLength")
    }
}

/// Everything a run needs, after merging the command line, the configuration file and the
/// defaults.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollSettings {
    pub name: String,
    pub email_files: Vec<String>,
    pub load_codes: Option<String>,
    pub codefile: Option<String>,
    pub votefile: Option<String>,
    pub input_type: Option<String>,
    pub resultfile: Option<String>,
    pub winfile: Option<String>,
    pub answerkey: Option<String>,
    pub email_column: String,
    pub organization_column: String,
    pub code_length: usize,
    pub rules: TallyRules,
    pub debug: bool,
}

pub fn read_config(path: &str) -> PollResult<PollConfig> {
    let contents = read_text_file(path)?;
    debug!("read_config: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Command line options take precedence over the configuration file.
pub fn build_settings(args: &Args, config: &PollConfig) -> PollResult<PollSettings> {
    let name = args
        .name
        .clone()
        .or_else(|| config.vote_name.clone())
        .unwrap_or_else(|| chrono::Local::now().to_string());

    let mut email_files = config.email_files.clone().unwrap_or_default();
    email_files.extend(args.emailfile.iter().cloned());

    let voter_code_column = args
        .code_column
        .clone()
        .or_else(|| config.voter_code_column.clone())
        .unwrap_or_else(|| DEFAULT_VOTER_CODE_COLUMN.to_string());
    let reserved_columns = config.reserved_columns.clone().unwrap_or_else(|| {
        DEFAULT_RESERVED_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect()
    });
    let rank_threshold = match args.rank {
        Some(x) => x,
        None => config.rank_threshold()?.unwrap_or(DEFAULT_RANK_THRESHOLD),
    };
    let code_length = match args.code_length {
        Some(x) => x,
        None => config.code_length()?.unwrap_or(DEFAULT_CODE_LENGTH),
    };

    let rules = TallyRules {
        voter_code_column,
        reserved_columns,
        rank_threshold,
    };
    rules.check().context(TallySnafu)?;
    check_code_length(code_length).context(TallySnafu)?;

    Ok(PollSettings {
        name,
        email_files,
        load_codes: args.load_codes.clone(),
        codefile: args.codefile.clone(),
        votefile: args.votefile.clone(),
        input_type: args.input_type.clone(),
        resultfile: args.resultfile.clone(),
        winfile: args.winfile.clone(),
        answerkey: args.answerkey.clone(),
        email_column: args
            .email_column
            .clone()
            .or_else(|| config.email_column.clone())
            .unwrap_or_else(|| DEFAULT_EMAIL_COLUMN.to_string()),
        organization_column: args
            .org_column
            .clone()
            .or_else(|| config.organization_column.clone())
            .unwrap_or_else(|| DEFAULT_ORGANIZATION_COLUMN.to_string()),
        code_length,
        rules,
        debug: args.debug,
    })
}

fn read_js_int(x: &Option<JSValue>, field: &str) -> PollResult<Option<usize>> {
    match x {
        None => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use vote_tally::TallyError;

    fn args(cmd: &[&str]) -> Args {
        let mut full = vec!["typevote"];
        full.extend_from_slice(cmd);
        Args::parse_from(full)
    }

    #[test]
    fn defaults() {
        let s = build_settings(&args(&["-n", "v1", "-e", "voters.txt"]), &PollConfig::default())
            .unwrap();
        assert_eq!(s.name, "v1");
        assert_eq!(s.email_files, vec!["voters.txt".to_string()]);
        assert_eq!(s.code_length, 12);
        assert_eq!(s.rules, TallyRules::default());
        assert_eq!(s.email_column, "email");
    }

    #[test]
    fn numbers_as_strings_or_numbers() {
        let config: PollConfig = serde_json::from_str(
            r#"{"voteName": "agm", "rankThreshold": "4", "codeLength": 16, "voterCodeColumn": "code"}"#,
        )
        .unwrap();
        let s = build_settings(&args(&[]), &config).unwrap();
        assert_eq!(s.name, "agm");
        assert_eq!(s.rules.rank_threshold, 4);
        assert_eq!(s.code_length, 16);
        assert_eq!(s.rules.voter_code_column, "code");
    }

    #[test]
    fn command_line_wins() {
        let config: PollConfig =
            serde_json::from_str(r#"{"voteName": "agm", "codeLength": 16, "emailFiles": ["a.txt"]}"#)
                .unwrap();
        let s = build_settings(
            &args(&["--name", "board", "--code-length", "8", "-e", "b.txt"]),
            &config,
        )
        .unwrap();
        assert_eq!(s.name, "board");
        assert_eq!(s.code_length, 8);
        assert_eq!(s.email_files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn bad_number_rejected() {
        let config: PollConfig = serde_json::from_str(r#"{"rankThreshold": "many"}"#).unwrap();
        assert!(matches!(
            build_settings(&args(&[]), &config),
            Err(PollError::ParsingJsonNumber { .. })
        ));
    }

    #[test]
    fn rank_threshold_out_of_range_rejected() {
        let config: PollConfig = serde_json::from_str(r#"{"rankThreshold": 4294967302}"#).unwrap();
        assert!(matches!(
            build_settings(&args(&[]), &config),
            Err(PollError::ParsingJsonNumber { .. })
        ));
        let config: PollConfig = serde_json::from_str(r#"{"rankThreshold": 0}"#).unwrap();
        assert!(matches!(
            build_settings(&args(&[]), &config),
            Err(PollError::Tally {
                source: TallyError::InvalidRankThreshold(0)
            })
        ));
        assert!(matches!(
            build_settings(&args(&["--rank", "0"]), &PollConfig::default()),
            Err(PollError::Tally {
                source: TallyError::InvalidRankThreshold(0)
            })
        ));
        assert!(matches!(
            build_settings(&args(&["--code-length", "65"]), &PollConfig::default()),
            Err(PollError::Tally {
                source: TallyError::InvalidCodeLength(65)
            })
        ));
    }
}
