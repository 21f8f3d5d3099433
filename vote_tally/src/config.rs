// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::Display;

/// The anonymized identity handed out to a voter.
///
/// Codes are lowercase hexadecimal strings derived from the salt and the email.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct VoterCode(pub String);

impl VoterCode {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for VoterCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered voter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterRecord {
    pub code: VoterCode,
    pub email: String,
    pub organization: String,
}

/// The cast votes, as read from a votefile.
///
/// The first row of the file is the header and defines the question labels.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoteTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One row of the votefile, keyed by the code of its voter.
/// Answers are positional and aligned with the header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub voter_code: VoterCode,
    pub answers: Vec<String>,
}

// ******** Output data structures *********

/// The histogram of the answers to one question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionTally {
    /// Position of the question in the votefile header.
    pub index: usize,
    pub label: String,
    /// Answers in the order they were first seen. The blank answer is the empty string.
    pub counts: Vec<(String, u64)>,
}

impl QuestionTally {
    pub fn total_votes(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub questions: Vec<QuestionTally>,
    pub rogue_codes: BTreeSet<VoterCode>,
    /// Only present when an answer key was supplied.
    pub quiz_scores: Option<BTreeMap<VoterCode, i64>>,
    /// Number of rows read from the votefile.
    pub record_count: usize,
    /// Number of distinct voter codes after deduplication, rogue ones included.
    pub unique_count: usize,
}

impl TallyResult {
    pub fn valid_count(&self) -> usize {
        self.unique_count - self.rogue_codes.len()
    }
}

/// Errors that abort a run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyError {
    /// Two distinct emails hashed to the same code.
    CodeCollision {
        code: VoterCode,
        email: String,
        existing_email: String,
    },
    /// A code in the registry is empty or malformed.
    InvalidVoterCode { code: VoterCode, email: String },
    MissingVoterCodeColumn { column: String },
    MalformedAnswerKey {
        lineno: usize,
        line: String,
        reason: String,
    },
    InvalidCodeLength(usize),
    InvalidRankThreshold(u32),
}

impl Error for TallyError {}

impl Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::CodeCollision {
                code,
                email,
                existing_email,
            } => write!(
                f,
                "Hash collision, {} clashes with {} hash \"{}\"",
                email, existing_email, code
            ),
            TallyError::InvalidVoterCode { code, email } => {
                write!(f, "Illegal voter code {:?} for {} in voter database", code.0, email)
            }
            TallyError::MissingVoterCodeColumn { column } => {
                write!(f, "No {} column in votefile", column)
            }
            TallyError::MalformedAnswerKey {
                lineno,
                line,
                reason,
            } => write!(f, "Answer key line {}: {} ({:?})", lineno, reason, line),
            TallyError::InvalidCodeLength(len) => {
                write!(f, "Code length must be between 1 and 64, got {}", len)
            }
            TallyError::InvalidRankThreshold(rank) => {
                write!(f, "Rank threshold must be at least 1, got {}", rank)
            }
        }
    }
}

// ********* Configuration **********

pub const DEFAULT_CODE_LENGTH: usize = 12;
pub const DEFAULT_RANK_THRESHOLD: u32 = 6;
pub const DEFAULT_VOTER_CODE_COLUMN: &str = "voterid";

/// Administrative columns of a typical form export. They are never tallied.
pub const DEFAULT_RESERVED_COLUMNS: [&str; 4] =
    ["#", "Network ID", "Start Date (UTC)", "Submit Date (UTC)"];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub voter_code_column: String,
    /// Excluded from tallying in addition to the voter code column.
    pub reserved_columns: Vec<String>,
    /// Comma count from which a question is treated as ranked choice, and the weight of
    /// the first ranked option.
    pub rank_threshold: u32,
}

impl TallyRules {
    /// With a threshold of 0, every answer without a comma would be read as a ranking.
    pub fn check(&self) -> Result<(), TallyError> {
        if self.rank_threshold == 0 {
            return Err(TallyError::InvalidRankThreshold(self.rank_threshold));
        }
        Ok(())
    }

    pub fn is_reserved(&self, label: &str) -> bool {
        label == self.voter_code_column || self.reserved_columns.iter().any(|c| c == label)
    }
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules {
            voter_code_column: DEFAULT_VOTER_CODE_COLUMN.to_string(),
            reserved_columns: DEFAULT_RESERVED_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rank_threshold: DEFAULT_RANK_THRESHOLD,
        }
    }
}
