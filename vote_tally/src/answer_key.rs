use log::debug;
use regex::Regex;
use std::collections::BTreeMap;

use crate::config::*;

/// The expected answer to one quiz question.
#[derive(Debug, Clone)]
pub struct AnswerKeyEntry {
    pub question_index: usize,
    pub points: i64,
    /// Must match the label of the question at `question_index`.
    pub question_pattern: Regex,
    pub answer_pattern: Regex,
}

/// All the quiz questions, by position in the votefile header.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    entries: BTreeMap<usize, AnswerKeyEntry>,
}

impl AnswerKey {
    /// Parses an answer key.
    ///
    /// Each line reads `index:points:questionPattern:answerPattern`. Blank lines and lines
    /// starting with `#` are ignored. The answer pattern extends to the end of the line
    /// and may contain colons.
    ///
    /// ```
    /// use vote_tally::answer_key::AnswerKey;
    ///
    /// let key = AnswerKey::load("# capitals\n2:5:Capital of France:^Paris$\n")?;
    /// assert_eq!(key.get(2).map(|e| e.points), Some(5));
    /// # Ok::<(), vote_tally::TallyError>(())
    /// ```
    pub fn load(text: &str) -> Result<AnswerKey, TallyError> {
        let mut entries: BTreeMap<usize, AnswerKeyEntry> = BTreeMap::new();
        for (idx, raw_line) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_line(line).map_err(|reason| TallyError::MalformedAnswerKey {
                lineno,
                line: line.to_string(),
                reason,
            })?;
            debug!(
                "AnswerKey::load: line {}: question {} worth {} points",
                lineno, entry.question_index, entry.points
            );
            entries.insert(entry.question_index, entry);
        }
        Ok(AnswerKey { entries })
    }

    pub fn get(&self, question_index: usize) -> Option<&AnswerKeyEntry> {
        self.entries.get(&question_index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &AnswerKeyEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Result<AnswerKeyEntry, String> {
    let fields: Vec<&str> = line.splitn(4, ':').collect();
    match fields.as_slice() {
        [index, points, question, answer] => {
            let question_index = index
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("bad question index {:?}: {}", index, e))?;
            let points = points
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("bad points {:?}: {}", points, e))?;
            let question_pattern = Regex::new(question)
                .map_err(|e| format!("bad question pattern {:?}: {}", question, e))?;
            let answer_pattern = Regex::new(answer)
                .map_err(|e| format!("bad answer pattern {:?}: {}", answer, e))?;
            Ok(AnswerKeyEntry {
                question_index,
                points,
                question_pattern,
                answer_pattern,
            })
        }
        _ => Err(format!("expected 4 fields, found {}", fields.len())),
    }
}
