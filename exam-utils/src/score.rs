use serde::Serialize;

use crate::attempt::{FinishReason, Session, SessionKind};

/// Aggregate result of a session, shaped for the results page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub exam_type: SessionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub correct: usize,
    /// Answers explicitly marked not correct.
    pub incorrect: usize,
    pub unanswered: usize,
    pub total: usize,
    pub time_used: u64,
    /// `correct / total * 100`, rounded half up.
    pub percentage: u32,
    pub finish_reason: Option<FinishReason>,
}

/// Scores `session` as it stands. Pure: no state is read besides the session.
pub fn score(session: &Session) -> ScoreReport {
    let total = session.len();
    let (correct, incorrect) =
        session
            .answers()
            .iter()
            .flatten()
            .fold((0, 0), |(correct, incorrect), answer| {
                if answer.is_correct {
                    (correct + 1, incorrect)
                } else {
                    (correct, incorrect + 1)
                }
            });

    ScoreReport {
        exam_type: session.kind(),
        topic: session.title().map(str::to_string),
        correct,
        incorrect,
        unanswered: total - correct - incorrect,
        total,
        time_used: session.timer().time_used_in_s(),
        percentage: percentage(correct, total),
        finish_reason: session.finish_reason(),
    }
}

/// Integer percentage rounded half up; zero for an empty session.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct * 200 + total) / (2 * total)) as u32
}

/// A question that was missed or skipped, for the mistakes review page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    /// 1-based question number in the session.
    pub number: usize,
    pub question_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub selected_index: Option<usize>,
    pub correct_index: Option<usize>,
    pub correct_option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

/// Every question not answered correctly, in session order.
pub fn review(session: &Session) -> Vec<ReviewItem> {
    session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
        .filter(|(_, (_, answer))| !answer.as_ref().is_some_and(|a| a.is_correct))
        .map(|(i, (question, answer))| ReviewItem {
            number: i + 1,
            question_id: question.id().to_string(),
            text: question.text().to_string(),
            options: question.options().to_vec(),
            selected_index: answer.as_ref().map(|a| a.selected_index),
            correct_index: question.correct_index(),
            correct_option: question.correct_option().to_string(),
            tip: question.tip().map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::tests::session;

    #[test]
    fn counts_add_up_to_total() {
        let mut s = session(10);
        for position in 0..7 {
            s.select(position, 0).unwrap();
        }
        s.select(7, 1).unwrap();

        let report = s.score();
        assert_eq!(report.correct, 7);
        assert_eq!(report.incorrect, 1);
        assert_eq!(report.unanswered, 2);
        assert_eq!(report.total, 10);
        assert_eq!(
            report.correct + report.incorrect + report.unanswered,
            report.total
        );
        assert_eq!(report.percentage, 70);
        assert_eq!(report.topic.as_deref(), Some("Tema topic_01"));
        assert_eq!(report.finish_reason, None);
    }

    #[test]
    fn score_is_live_and_repeatable() {
        let mut s = session(4);
        assert_eq!(s.score().correct, 0);
        s.select(0, 0).unwrap();
        assert_eq!(s.score().correct, 1);
        assert_eq!(s.score(), s.score());
        s.clear(0).unwrap();
        assert_eq!(s.score().unanswered, 4);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn time_used_comes_from_the_timer() {
        let mut s = session(1);
        for _ in 0..42 {
            s.tick();
        }
        assert_eq!(s.finish().time_used, 42);
    }

    #[test]
    fn review_lists_wrong_and_skipped_questions() {
        let mut s = session(3);
        s.select(0, 0).unwrap();
        s.select(1, 3).unwrap();

        let items = review(&s);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].number, 2);
        assert_eq!(items[0].selected_index, Some(3));
        assert_eq!(items[0].correct_index, Some(0));
        assert_eq!(items[1].number, 3);
        assert_eq!(items[1].selected_index, None);
    }

    #[test]
    fn report_serializes_for_results_page() {
        let mut s = session(2);
        s.select(0, 0).unwrap();
        let value = serde_json::to_value(s.finish()).unwrap();

        assert_eq!(value["examType"], "practice");
        assert_eq!(value["timeUsed"], 0);
        assert_eq!(value["percentage"], 50);
        assert_eq!(value["finishReason"], "manual");
    }
}
