//! Turns the raw tallies into results: percentages, numeric scores, ranked-choice
//! scores, winners and quiz summaries.

use log::{debug, warn};
use std::collections::BTreeMap;

use crate::config::*;
use crate::registry::Registry;

/// Scalar scores of a question whose answers are (at least partly) integers.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct NumericScore {
    /// Sum of the numeric answers, weighted by their counts.
    pub sum: i64,
    /// Number of votes with a numeric answer.
    pub numeric_votes: u64,
    pub avg: f64,
    /// `log10(numeric_votes) + 1`, rewards questions with many numeric answers.
    pub bonus: f64,
    /// `avg * bonus`
    pub mix: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuestionSummary {
    pub index: usize,
    pub label: String,
    pub total_votes: u64,
    /// Each answer with its count and share of the total, in first-seen order.
    pub shares: Vec<(String, u64, f64)>,
    pub numeric: Option<NumericScore>,
    /// Present when the question was detected as ranked choice. Options with their
    /// accumulated scores, in first-seen order.
    pub ranked: Option<Vec<(String, u64)>>,
    /// The answers (or ranked options) with the highest count (or score).
    pub winners: Vec<String>,
    /// The share of the winners. For ranked questions, the share of the total score.
    pub winning_share: f64,
}

impl QuestionSummary {
    pub fn is_scored(&self) -> bool {
        self.numeric.is_some()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct OrganizationQuizScore {
    pub organization: String,
    pub participants: usize,
    pub total: i64,
    pub average: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuizSummary {
    pub organizations: Vec<OrganizationQuizScore>,
    pub participants: usize,
    /// Over all the participants, not over the organizations.
    pub overall_average: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PollSummary {
    /// Questions without any valid vote are left out.
    pub questions: Vec<QuestionSummary>,
    pub quiz: Option<QuizSummary>,
}

/// The share of each answer. None if nobody answered.
pub fn percentages_for(tally: &QuestionTally) -> Option<Vec<(String, f64)>> {
    let total = tally.total_votes();
    if total == 0 {
        return None;
    }
    Some(
        tally
            .counts
            .iter()
            .map(|(answer, count)| (answer.clone(), *count as f64 / total as f64))
            .collect(),
    )
}

/// The integer value of an answer, if it has one.
pub fn numeric_value(answer: &str) -> Option<i64> {
    answer.trim().parse::<i64>().ok()
}

/// Computes the scalar scores of a question. None if no answer is an integer, or if the sum
/// of the answers does not fit in an `i64`.
pub fn numeric_score(tally: &QuestionTally) -> Option<NumericScore> {
    let numeric: Vec<(i64, u64)> = tally
        .counts
        .iter()
        .filter_map(|(answer, count)| numeric_value(answer).map(|v| (v, *count)))
        .collect();
    if numeric.is_empty() {
        return None;
    }
    let sum = match checked_sum(&numeric) {
        Some(sum) => sum,
        None => {
            warn!(
                "Question {:?}: the sum of the numeric answers overflows, not scored",
                tally.label
            );
            return None;
        }
    };
    let numeric_votes: u64 = numeric.iter().map(|(_, c)| *c).sum();
    if numeric_votes == 0 {
        return None;
    }
    let avg = sum as f64 / numeric_votes as f64;
    let bonus = (numeric_votes as f64).log10() + 1.0;
    Some(NumericScore {
        sum,
        numeric_votes,
        avg,
        bonus,
        mix: avg * bonus,
    })
}

fn checked_sum(numeric: &[(i64, u64)]) -> Option<i64> {
    let mut total: i128 = 0;
    for (value, count) in numeric.iter() {
        let product = (*value as i128).checked_mul(*count as i128)?;
        total = total.checked_add(product)?;
    }
    i64::try_from(total).ok()
}

/// A question is ranked choice when every distinct answer has the same number of commas,
/// and that number reaches the rank threshold.
pub fn is_ranked_choice(tally: &QuestionTally, rank_threshold: u32) -> bool {
    let mut comma_counts = tally
        .counts
        .iter()
        .map(|(answer, _)| answer.matches(',').count());
    match comma_counts.next() {
        Some(first) => first >= rank_threshold as usize && comma_counts.all(|c| c == first),
        None => false,
    }
}

/// Scores each option of a ranked-choice question.
///
/// The option at position `w` in an answer gets `max(rank - w, 0)` points for every vote
/// for that answer.
pub fn ranked_scores(tally: &QuestionTally, rank: u32) -> Vec<(String, u64)> {
    let mut scores: Vec<(String, u64)> = Vec::new();
    for (answer, count) in tally.counts.iter() {
        for (w, option) in answer.split(',').map(|s| s.trim()).enumerate() {
            let weight = (rank as u64).saturating_sub(w as u64);
            let points = weight * count;
            if let Some(elt) = scores.iter_mut().find(|(name, _)| name == option) {
                elt.1 += points;
            } else {
                scores.push((option.to_string(), points));
            }
        }
    }
    debug!("ranked_scores: {:?}: {:?}", tally.label, scores);
    scores
}

// The entries with the highest value, ties included.
fn find_winners(entries: &[(String, u64)]) -> (Vec<String>, u64) {
    let mut max_seen: u64 = 0;
    let mut winners: Vec<String> = Vec::new();
    for (name, value) in entries.iter() {
        if winners.is_empty() || *value > max_seen {
            max_seen = *value;
            winners = vec![name.clone()];
        } else if *value == max_seen {
            winners.push(name.clone());
        }
    }
    (winners, max_seen)
}

pub fn summarize_question(tally: &QuestionTally, rank_threshold: u32) -> Option<QuestionSummary> {
    let total_votes = tally.total_votes();
    let percentages = percentages_for(tally)?;
    let shares: Vec<(String, u64, f64)> = tally
        .counts
        .iter()
        .zip(percentages.into_iter())
        .map(|((answer, count), (_, share))| (answer.clone(), *count, share))
        .collect();

    let ranked = if is_ranked_choice(tally, rank_threshold) {
        Some(ranked_scores(tally, rank_threshold))
    } else {
        None
    };

    let (winners, winning_share) = match &ranked {
        Some(scores) => {
            let (winners, max_score) = find_winners(scores);
            let total_score: u64 = scores.iter().map(|(_, s)| *s).sum();
            let share = if total_score > 0 {
                max_score as f64 / total_score as f64
            } else {
                0.0
            };
            (winners, share)
        }
        None => {
            let (winners, max_count) = find_winners(&tally.counts);
            (winners, max_count as f64 / total_votes as f64)
        }
    };

    Some(QuestionSummary {
        index: tally.index,
        label: tally.label.clone(),
        total_votes,
        shares,
        numeric: numeric_score(tally),
        ranked,
        winners,
        winning_share,
    })
}

/// Aggregates all the results of a tally.
pub fn summarize(result: &TallyResult, registry: &Registry, rank_threshold: u32) -> PollSummary {
    let questions = result
        .questions
        .iter()
        .filter_map(|q| summarize_question(q, rank_threshold))
        .collect();
    let quiz = result
        .quiz_scores
        .as_ref()
        .map(|scores| quiz_by_organization(scores, registry));
    PollSummary { questions, quiz }
}

/// Orders the scored questions by the sum of their numeric answers, highest first.
///
/// Questions with the same sum share the same ordinal, and the next sum takes the next
/// ordinal.
pub fn rank_questions(questions: &[QuestionSummary]) -> Vec<(usize, &QuestionSummary)> {
    let mut scored: Vec<(&QuestionSummary, i64)> = questions
        .iter()
        .filter_map(|q| q.numeric.map(|n| (q, n.sum)))
        .collect();
    // Stable: equal sums keep the questionnaire order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut res: Vec<(usize, &QuestionSummary)> = Vec::new();
    let mut ordinal: usize = 0;
    let mut previous: Option<i64> = None;
    for (q, sum) in scored {
        if previous != Some(sum) {
            ordinal += 1;
            previous = Some(sum);
        }
        res.push((ordinal, q));
    }
    res
}

/// Groups the quiz scores by the organization of the voters.
pub fn quiz_by_organization(
    scores: &BTreeMap<VoterCode, i64>,
    registry: &Registry,
) -> QuizSummary {
    let mut by_org: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for (code, points) in scores.iter() {
        let organization = registry
            .lookup(code)
            .map(|r| r.organization.clone())
            .unwrap_or_default();
        let elt = by_org.entry(organization).or_insert((0, 0));
        elt.0 += 1;
        elt.1 = elt.1.saturating_add(*points);
    }

    let organizations: Vec<OrganizationQuizScore> = by_org
        .into_iter()
        .map(|(organization, (participants, total))| OrganizationQuizScore {
            organization,
            participants,
            total,
            average: total as f64 / participants as f64,
        })
        .collect();

    let participants: usize = organizations.iter().map(|o| o.participants).sum();
    let grand_total: i64 = organizations
        .iter()
        .fold(0i64, |acc, o| acc.saturating_add(o.total));
    let overall_average = if participants > 0 {
        grand_total as f64 / participants as f64
    } else {
        0.0
    };
    QuizSummary {
        organizations,
        participants,
        overall_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    fn tally(counts: &[(&str, u64)]) -> QuestionTally {
        QuestionTally {
            index: 1,
            label: "Q".to_string(),
            counts: counts.iter().map(|(a, c)| (a.to_string(), *c)).collect(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn percentages() {
        let p = percentages_for(&tally(&[("Red", 2), ("Blue", 1)])).unwrap();
        assert!(close(p[0].1, 2.0 / 3.0));
        assert!(close(p[1].1, 1.0 / 3.0));
        assert!(percentages_for(&tally(&[])).is_none());
    }

    #[test]
    fn scalar_scores() {
        let n = numeric_score(&tally(&[("1", 3), ("2", 1)])).unwrap();
        assert_eq!(n.sum, 5);
        assert_eq!(n.numeric_votes, 4);
        assert!(close(n.avg, 1.25));
        assert!(close(n.bonus, 1.602));
        assert!(close(n.mix, 2.003));
    }

    #[test]
    fn non_numeric_answers_ignored_in_scores() {
        let n = numeric_score(&tally(&[("5", 2), ("", 4), ("n/a", 1)])).unwrap();
        assert_eq!(n.sum, 10);
        assert_eq!(n.numeric_votes, 2);
        assert!(close(n.bonus, 2f64.log10() + 1.0));
        assert!(numeric_score(&tally(&[("yes", 1), ("", 1)])).is_none());
    }

    #[test]
    fn huge_answers_are_not_scored() {
        let max = i64::MAX.to_string();
        assert!(numeric_score(&tally(&[(max.as_str(), 2)])).is_none());
        assert!(numeric_score(&tally(&[(max.as_str(), 1), ("1", 1)])).is_none());
        let min = i64::MIN.to_string();
        assert!(numeric_score(&tally(&[(min.as_str(), 1), ("-1", 1)])).is_none());
        // Still fits.
        let n = numeric_score(&tally(&[(max.as_str(), 1), ("-1", 1)])).unwrap();
        assert_eq!(n.sum, i64::MAX - 1);
        assert_eq!(n.numeric_votes, 2);
    }

    #[test]
    fn huge_question_does_not_affect_others() {
        let max = i64::MAX.to_string();
        let s = summarize_question(&tally(&[(max.as_str(), 2), ("yes", 1)]), 6).unwrap();
        assert!(!s.is_scored());
        assert_eq!(s.winners, vec![max.clone()]);
        let qs = vec![s, summarize_question(&tally(&[("3", 1)]), 6).unwrap()];
        let ranking = rank_questions(&qs);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].0, 1);
    }

    #[test]
    fn ranked_detection() {
        let t = tally(&[("A,B,C,D,E,F,G", 2), ("G,F,E,D,C,B,A", 1)]);
        assert!(is_ranked_choice(&t, 6));
        let mixed = tally(&[("A,B,C,D,E,F,G", 2), ("A,B", 1)]);
        assert!(!is_ranked_choice(&mixed, 6));
        let short = tally(&[("A,B,C", 2)]);
        assert!(!is_ranked_choice(&short, 6));
        assert!(!is_ranked_choice(&tally(&[]), 6));
    }

    #[test]
    fn ranked_weights() {
        let t = tally(&[("A,B,C,D,E,F,G", 2), ("G,F,E,D,C,B,A", 1)]);
        let scores: BTreeMap<String, u64> = ranked_scores(&t, 6).into_iter().collect();
        // A: 6*2 + 0*1, G: 0*2 + 6*1, D: 3*2 + 3*1
        assert_eq!(scores["A"], 12);
        assert_eq!(scores["G"], 6);
        assert_eq!(scores["D"], 9);
        assert_eq!(scores["B"], 5 * 2 + 1);
    }

    #[test]
    fn ranked_summary_uses_scores() {
        let t = tally(&[("A,B,C,D,E,F,G", 2), ("G,F,E,D,C,B,A", 1)]);
        let s = summarize_question(&t, 6).unwrap();
        assert!(s.ranked.is_some());
        assert_eq!(s.winners, vec!["A".to_string()]);
    }

    #[test]
    fn ties_are_reported() {
        let s = summarize_question(&tally(&[("Red", 2), ("Blue", 2), ("Green", 1)]), 6).unwrap();
        assert_eq!(s.winners, vec!["Red".to_string(), "Blue".to_string()]);
        assert!(close(s.winning_share, 0.4));
        assert!(!s.is_scored());
    }

    #[test]
    fn empty_question_skipped() {
        assert!(summarize_question(&tally(&[]), 6).is_none());
    }

    #[test]
    fn dense_ranking_of_questions() {
        let qs: Vec<QuestionSummary> = vec![
            tally(&[("1", 3)]),
            tally(&[("5", 1)]),
            tally(&[("yes", 3)]),
            tally(&[("3", 1)]),
            tally(&[("2", 1)]),
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut s = summarize_question(t, 6).unwrap();
            s.index = i;
            s
        })
        .collect();
        let ranking: Vec<(usize, usize)> = rank_questions(&qs)
            .iter()
            .map(|(ord, q)| (*ord, q.index))
            .collect();
        assert_eq!(ranking, vec![(1, 1), (2, 0), (2, 3), (3, 4)]);
    }

    #[test]
    fn quiz_weighted_by_participants() {
        let mut b = RegistryBuilder::new("quiz", 12).unwrap();
        let mut codes = Vec::new();
        for (email, org) in [
            ("a@x.org", "acme"),
            ("b@x.org", "acme"),
            ("c@x.org", "acme"),
            ("d@x.org", "globex"),
        ] {
            b.add_email(email, org).unwrap();
        }
        let reg = b.build();
        for r in reg.records() {
            codes.push(r.code.clone());
        }
        let scores: BTreeMap<VoterCode, i64> = vec![
            (codes[0].clone(), 1),
            (codes[1].clone(), 2),
            (codes[2].clone(), 3),
            (codes[3].clone(), 10),
        ]
        .into_iter()
        .collect();
        let q = quiz_by_organization(&scores, &reg);
        assert_eq!(q.organizations.len(), 2);
        assert_eq!(q.organizations[0].organization, "ACME");
        assert_eq!(q.organizations[0].total, 6);
        assert!(close(q.organizations[0].average, 2.0));
        assert!(close(q.organizations[1].average, 10.0));
        assert_eq!(q.participants, 4);
        // Not (2 + 10) / 2
        assert!(close(q.overall_average, 4.0));
    }
}
