// Human readable reports.

use vote_tally::aggregate::{rank_questions, PollSummary, QuestionSummary, QuizSummary};
use vote_tally::TallyResult;

fn display_answer(answer: &str) -> &str {
    if answer.is_empty() {
        "<BLANK>"
    } else {
        answer
    }
}

fn display_organization(organization: &str) -> &str {
    if organization.is_empty() {
        "<NONE>"
    } else {
        organization
    }
}

fn question_lines(q: &QuestionSummary) -> Vec<String> {
    let mut lines: Vec<String> = vec![format!(
        "{}. Question \"{}\", total votes {}, scored: {}",
        q.index,
        q.label,
        q.total_votes,
        if q.is_scored() { "yes" } else { "no" }
    )];

    match &q.ranked {
        Some(scores) => {
            lines.push("  Ranked choice, accumulated scores:".to_string());
            for (option, score) in scores.iter() {
                lines.push(format!("  {}: {} points", display_answer(option), score));
            }
        }
        None => {
            for (answer, count, share) in q.shares.iter() {
                lines.push(format!(
                    "  {}: {} / {} = {:6.2}%",
                    display_answer(answer),
                    count,
                    q.total_votes,
                    100.0 * share
                ));
            }
        }
    }

    if let Some(n) = q.numeric {
        lines.push(format!(
            "  Sum {}, average {:.3}, mix {:.3} ({} numeric votes)",
            n.sum, n.avg, n.mix, n.numeric_votes
        ));
    }

    let winners: Vec<&str> = q.winners.iter().map(|w| display_answer(w)).collect();
    match winners.as_slice() {
        [] => {}
        [winner] => lines.push(format!(
            "  Winner: {} ({:.2}%)",
            winner,
            100.0 * q.winning_share
        )),
        _ => lines.push(format!(
            "  Tie between: {} ({:.2}% each)",
            winners.join(", "),
            100.0 * q.winning_share
        )),
    }
    lines
}

fn quiz_lines(quiz: &QuizSummary) -> Vec<String> {
    let mut lines: Vec<String> = vec!["Quiz scores by organization".to_string()];
    for org in quiz.organizations.iter() {
        lines.push(format!(
            "  {}: {} participants, total {}, average {:.2}",
            display_organization(&org.organization),
            org.participants,
            org.total,
            org.average
        ));
    }
    lines.push(format!(
        "Overall average {:.2} over {} participants",
        quiz.overall_average, quiz.participants
    ));
    lines
}

/// The full result of a vote: every question, the rogue codes and the quiz scores.
pub fn format_result_report(
    name: &str,
    generated_on: &str,
    summary: &PollSummary,
    tally: &TallyResult,
) -> String {
    let mut lines: Vec<String> = vec![
        format!("Results from vote \"{}\"", name),
        format!("Generated on {}", generated_on),
        "".to_string(),
    ];
    for q in summary.questions.iter() {
        lines.extend(question_lines(q));
        lines.push("".to_string());
    }

    let rogue: Vec<&str> = tally.rogue_codes.iter().map(|c| c.as_str()).collect();
    lines.push("-----".to_string());
    lines.push(format!(
        "Total discarded voterids: {}, ids: {}",
        rogue.len(),
        rogue.join(", ")
    ));

    if let Some(quiz) = &summary.quiz {
        lines.push("".to_string());
        lines.push("-----".to_string());
        lines.extend(quiz_lines(quiz));
    }
    lines.push("".to_string());
    lines.join("\n")
}

/// The scored questions, from the highest sum to the lowest.
pub fn format_win_report(name: &str, summary: &PollSummary) -> String {
    let mut lines: Vec<String> = vec![
        format!("Ranking of questions from vote \"{}\" by sum of scores", name),
        "".to_string(),
    ];
    for (ordinal, q) in rank_questions(&summary.questions) {
        if let Some(n) = q.numeric {
            lines.push(format!(
                "{}. Question {} \"{}\": sum {}, average {:.3}, mix {:.3}",
                ordinal, q.index, q.label, n.sum, n.avg, n.mix
            ));
        }
    }
    lines.push("".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vote_tally::aggregate::summarize_question;
    use vote_tally::{QuestionTally, VoterCode};

    fn summary(tallies: &[(&str, Vec<(&str, u64)>)]) -> PollSummary {
        let questions = tallies
            .iter()
            .enumerate()
            .filter_map(|(idx, (label, counts))| {
                let t = QuestionTally {
                    index: idx + 1,
                    label: label.to_string(),
                    counts: counts.iter().map(|(a, c)| (a.to_string(), *c)).collect(),
                };
                summarize_question(&t, 6)
            })
            .collect();
        PollSummary {
            questions,
            quiz: None,
        }
    }

    fn empty_tally() -> TallyResult {
        TallyResult {
            questions: vec![],
            rogue_codes: BTreeSet::new(),
            quiz_scores: None,
            record_count: 0,
            unique_count: 0,
        }
    }

    #[test]
    fn blank_answers_and_ties() {
        let s = summary(&[("Comment", vec![("", 1), ("ok", 1)])]);
        let text = format_result_report("v", "now", &s, &empty_tally());
        assert!(text.contains("  <BLANK>: 1 / 2 =  50.00%"));
        assert!(text.contains("  Tie between: <BLANK>, ok (50.00% each)"));
        assert!(text.contains("Total discarded voterids: 0, ids: \n"));
    }

    #[test]
    fn ranked_questions_show_scores_only() {
        let s = summary(&[("Order", vec![("A,B,C,D,E,F,G", 1)])]);
        let text = format_result_report("v", "now", &s, &empty_tally());
        assert!(text.contains("  A: 6 points"));
        assert!(text.contains("  G: 0 points"));
        assert!(!text.contains("A,B,C,D,E,F,G: 1 / 1"));
    }

    #[test]
    fn scalar_scores_printed() {
        let s = summary(&[("Rating", vec![("1", 3), ("2", 1)])]);
        let text = format_result_report("v", "now", &s, &empty_tally());
        assert!(text.contains("scored: yes"));
        assert!(text.contains("  Sum 5, average 1.250, mix 2.003 (4 numeric votes)"));
    }

    #[test]
    fn rogue_codes_listed() {
        let mut tally = empty_tally();
        tally.rogue_codes.insert(VoterCode("bbb".to_string()));
        tally.rogue_codes.insert(VoterCode("aaa".to_string()));
        let text = format_result_report("v", "now", &summary(&[]), &tally);
        assert!(text.contains("Total discarded voterids: 2, ids: aaa, bbb"));
    }

    #[test]
    fn win_report_shares_ordinals() {
        let s = summary(&[
            ("Q1", vec![("2", 1)]),
            ("Q2", vec![("4", 1)]),
            ("Q3", vec![("yes", 1)]),
            ("Q4", vec![("1", 2)]),
        ]);
        let text = format_win_report("v", &s);
        assert!(text.contains("1. Question 2 \"Q2\": sum 4"));
        assert!(text.contains("2. Question 1 \"Q1\": sum 2"));
        assert!(text.contains("2. Question 4 \"Q4\": sum 2"));
        assert!(!text.contains("Q3"));
    }
}
