mod config;
pub mod aggregate;
pub mod anonymizer;
pub mod answer_key;
pub mod registry;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::answer_key::AnswerKey;
pub use crate::config::*;
use crate::registry::Registry;

/// A ballot that survived deduplication, with the row it was read from.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RetainedBallot {
    row: usize,
    ballot: Ballot,
}

/// Counts the votes of the registered voters.
///
/// Arguments:
/// * `table` the votefile, header included
/// * `registry` the registered voters. Votes from other codes are rogue and discarded.
/// * `answer_key` if provided, the quiz scores of the voters are computed
/// * `rules` the columns to use and to ignore
pub fn tally_votes(
    table: &VoteTable,
    registry: &Registry,
    answer_key: Option<&AnswerKey>,
    rules: &TallyRules,
) -> Result<TallyResult, TallyError> {
    info!(
        "Processing {:?} vote records against {:?} voters",
        table.rows.len(),
        registry.len()
    );
    registry.check_integrity()?;

    let code_idx = table
        .header
        .iter()
        .position(|label| *label == rules.voter_code_column)
        .ok_or_else(|| TallyError::MissingVoterCodeColumn {
            column: rules.voter_code_column.clone(),
        })?;

    let retained = dedup_ballots(table, code_idx);

    // Split between registered and rogue voters.
    let mut known: Vec<&Ballot> = Vec::new();
    let mut rogue_codes: BTreeSet<VoterCode> = BTreeSet::new();
    for rb in retained.iter() {
        debug!("Processing vote from {}: {:?}", rb.ballot.voter_code, rb.ballot);
        if registry.contains(&rb.ballot.voter_code) {
            known.push(&rb.ballot);
        } else {
            debug!(">> Rogue voter code {:?} <<", rb.ballot.voter_code.0);
            rogue_codes.insert(rb.ballot.voter_code.clone());
        }
    }

    let mut questions: Vec<QuestionTally> = table
        .header
        .iter()
        .enumerate()
        .filter(|(_, label)| !rules.is_reserved(label))
        .map(|(index, label)| QuestionTally {
            index,
            label: label.clone(),
            counts: Vec::new(),
        })
        .collect();

    for ballot in known.iter() {
        for q in questions.iter_mut() {
            let response = ballot.answers[q.index].as_str();
            add_response(&mut q.counts, response);
        }
    }

    let quiz_scores = answer_key.map(|key| score_quiz(&table.header, &known, key));

    info!(
        "Read {} records resulting in {} unique votes, {} valid, {} rogue",
        table.rows.len(),
        retained.len(),
        known.len(),
        rogue_codes.len()
    );

    Ok(TallyResult {
        questions,
        rogue_codes,
        quiz_scores,
        record_count: table.rows.len(),
        unique_count: retained.len(),
    })
}

// Keeps the last ballot of each voter code, in the order the codes first appear.
fn dedup_ballots(table: &VoteTable, code_idx: usize) -> Vec<RetainedBallot> {
    let mut retained: Vec<RetainedBallot> = Vec::new();
    let mut positions: HashMap<VoterCode, usize> = HashMap::new();
    for (row, cells) in table.rows.iter().enumerate() {
        // Short rows are padded with blank answers.
        let answers: Vec<String> = (0..table.header.len())
            .map(|idx| cells.get(idx).cloned().unwrap_or_default())
            .collect();
        let voter_code = VoterCode(answers[code_idx].trim().to_string());
        debug!("Reading vote from {}: {:?}", voter_code, answers);
        let ballot = Ballot {
            voter_code: voter_code.clone(),
            answers,
        };
        if let Some(pos) = positions.get(&voter_code) {
            let previous = &mut retained[*pos];
            debug!(
                "Discarding vote from {} in row {}, superseded by row {}",
                voter_code,
                previous.row + 1,
                row + 1
            );
            *previous = RetainedBallot { row, ballot };
        } else {
            positions.insert(voter_code, retained.len());
            retained.push(RetainedBallot { row, ballot });
        }
    }
    retained
}

fn add_response(counts: &mut Vec<(String, u64)>, response: &str) {
    if let Some(elt) = counts.iter_mut().find(|(answer, _)| answer == response) {
        elt.1 += 1;
    } else {
        counts.push((response.to_string(), 1));
    }
}

fn score_quiz(header: &[String], known: &[&Ballot], key: &AnswerKey) -> BTreeMap<VoterCode, i64> {
    let mut scores: BTreeMap<VoterCode, i64> = BTreeMap::new();
    for ballot in known.iter() {
        scores.insert(ballot.voter_code.clone(), 0);
    }

    for entry in key.entries() {
        let label = match header.get(entry.question_index) {
            Some(label) => label,
            None => {
                warn!(
                    "Answer key question {} is beyond the {} columns of the votefile, skipping",
                    entry.question_index,
                    header.len()
                );
                continue;
            }
        };
        if !entry.question_pattern.is_match(label) {
            warn!(
                "Answer key question {}: label {:?} does not match {:?}, skipping",
                entry.question_index,
                label,
                entry.question_pattern.as_str()
            );
            continue;
        }
        for ballot in known.iter() {
            let answer = ballot.answers[entry.question_index].as_str();
            if entry.answer_pattern.is_match(answer) {
                debug!(
                    "score_quiz: {} answered question {} correctly: {:?}",
                    ballot.voter_code, entry.question_index, answer
                );
                if let Some(score) = scores.get_mut(&ballot.voter_code) {
                    *score = score.saturating_add(entry.points);
                }
            }
        }
    }
    scores
}
