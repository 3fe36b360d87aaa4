use std::sync::Arc;

use rand::{Rng, seq::SliceRandom};
use schema::Question;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    score::{ReviewItem, ScoreReport, review, score},
    timer::{Timer, TimerEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    /// Every question of one topic, in store order.
    Practice,
    /// A random subsample of one topic.
    TopicExam,
    /// The fixed-composition, countdown-timed SIECOPOL exam.
    Mock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishReason {
    Manual,
    TimeExpired,
}

/// A question as seen in one session, with its own option order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionQuestion {
    question: Arc<Question>,
    options: Vec<String>,
}

impl SessionQuestion {
    /// Pairs `question` with a uniformly shuffled copy of its options.
    pub fn shuffled<R: Rng + ?Sized>(question: Arc<Question>, rng: &mut R) -> Self {
        let mut options = question.options.clone();
        options.shuffle(rng);
        Self { question, options }
    }

    /// Pairs `question` with its options in canonical order.
    pub fn in_store_order(question: Arc<Question>) -> Self {
        let options = question.options.clone();
        Self { question, options }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn topic_id(&self) -> &str {
        &self.question.topic_id
    }

    pub fn text(&self) -> &str {
        &self.question.text
    }

    pub fn tip(&self) -> Option<&str> {
        self.question.tip.as_deref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_option(&self) -> &str {
        &self.question.correct_option
    }

    /// Position of the correct option in this session's order.
    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|o| o == &self.question.correct_option)
    }

    pub(crate) fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options.shuffle(rng);
    }
}

/// A recorded choice. Indices refer to the session's option order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub selected_index: usize,
    pub is_correct: bool,
    /// `None` when the question's correct option is missing from its options.
    pub correct_index: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Recorded,
    /// The position already had an answer, which was kept.
    AlreadyAnswered,
}

/// A contiguous run of questions drawn from one topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicBlock {
    pub topic_id: String,
    pub name: String,
    pub short_name: String,
    pub start: usize,
    pub len: usize,
}

impl TopicBlock {
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.start + self.len
    }
}

/// Where a question sits within its topic block, for "3 of 8" style progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPosition {
    pub topic_id: String,
    pub name: String,
    pub short_name: String,
    /// 1-based position within the block.
    pub current: usize,
    pub total: usize,
    /// 1-based block number.
    pub block: usize,
    pub blocks: usize,
}

/// One quiz attempt. Owned by the screen running it and discarded when it ends.
#[derive(Clone, Debug)]
pub struct Session {
    kind: SessionKind,
    title: Option<String>,
    questions: Vec<SessionQuestion>,
    answers: Vec<Option<Answer>>,
    blocks: Vec<TopicBlock>,
    current_index: usize,
    timer: Timer,
    finished: Option<FinishReason>,
}

impl Session {
    /// Callers guarantee `questions` is non-empty and `blocks` cover it in order.
    pub(crate) fn new(
        kind: SessionKind,
        title: Option<String>,
        questions: Vec<SessionQuestion>,
        blocks: Vec<TopicBlock>,
        timer: Timer,
    ) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            kind,
            title,
            questions,
            answers,
            blocks,
            current_index: 0,
            timer,
            finished: None,
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Topic name for single-topic sessions.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    pub fn question(&self, position: usize) -> Option<&SessionQuestion> {
        self.questions.get(position)
    }

    /// Answers aligned with `questions`; `None` marks an unanswered position.
    pub fn answers(&self) -> &[Option<Answer>] {
        &self.answers
    }

    pub fn answer(&self, position: usize) -> Option<&Answer> {
        self.answers.get(position).and_then(Option::as_ref)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().flatten().count()
    }

    pub fn blocks(&self) -> &[TopicBlock] {
        &self.blocks
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &SessionQuestion {
        &self.questions[self.current_index]
    }

    /// Option chosen at the current position, if any.
    pub fn current_selection(&self) -> Option<usize> {
        self.answer(self.current_index).map(|a| a.selected_index)
    }

    pub fn tip(&self, position: usize) -> Option<&str> {
        self.question(position).and_then(SessionQuestion::tip)
    }

    /// Records `option` as the answer at `position`.
    ///
    /// An answered position is locked: selecting again keeps the first answer
    /// until `clear` is called.
    pub fn select(&mut self, position: usize, option: usize) -> Result<SelectOutcome, Error> {
        self.ensure_active()?;
        let question = self.questions.get(position).ok_or(Error::InvalidPosition {
            position,
            len: self.questions.len(),
        })?;
        if option >= question.options().len() {
            return Err(Error::InvalidOption {
                position,
                option,
                len: question.options().len(),
            });
        }
        if self.answers[position].is_some() {
            debug!(position, option, "position already answered");
            return Ok(SelectOutcome::AlreadyAnswered);
        }

        let correct_index = question.correct_index();
        if correct_index.is_none() {
            warn!(
                question = question.id(),
                correct_option = question.correct_option(),
                "correct option missing from options"
            );
        }
        let is_correct = question.options()[option] == question.correct_option();

        self.answers[position] = Some(Answer {
            question_id: question.id().to_string(),
            selected_index: option,
            is_correct,
            correct_index,
        });
        debug!(position, option, is_correct, "answer recorded");

        Ok(SelectOutcome::Recorded)
    }

    /// Removes the answer at `position`. Returns whether one was present.
    pub fn clear(&mut self, position: usize) -> Result<bool, Error> {
        self.ensure_active()?;
        self.ensure_position(position)?;
        Ok(self.answers[position].take().is_some())
    }

    pub fn go_to(&mut self, position: usize) -> Result<(), Error> {
        self.ensure_position(position)?;
        self.current_index = position;
        Ok(())
    }

    /// Moves forward one question. Returns `false` on the last question.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one question. Returns `false` on the first question.
    pub fn prev(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Starts the attempt over on the same questions.
    ///
    /// Options are reshuffled, answers cleared, the first question selected
    /// and the timer restarted.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Error> {
        self.ensure_active()?;
        for question in self.questions.iter_mut() {
            question.reshuffle(rng);
        }
        self.answers.iter_mut().for_each(|a| *a = None);
        self.current_index = 0;
        self.timer.restart();
        info!(kind = ?self.kind, questions = self.questions.len(), "session reset");
        Ok(())
    }

    /// Advances the clock by one second. A countdown reaching zero finishes
    /// the session; ticks after that are ignored.
    pub fn tick(&mut self) -> TimerEvent {
        if self.finished.is_some() {
            return TimerEvent::Stopped;
        }
        let event = self.timer.tick();
        if event == TimerEvent::Expired {
            self.finished = Some(FinishReason::TimeExpired);
            info!(kind = ?self.kind, "time is up, session finished");
        }
        event
    }

    /// Ends the attempt and returns its score. Finishing twice returns the
    /// same report.
    pub fn finish(&mut self) -> ScoreReport {
        if self.finished.is_none() {
            self.finished = Some(FinishReason::Manual);
            self.timer.stop();
            info!(kind = ?self.kind, "session finished");
        }
        score(self)
    }

    /// Current score; may be called at any time.
    pub fn score(&self) -> ScoreReport {
        score(self)
    }

    /// Questions not answered correctly, for reviewing mistakes.
    pub fn review(&self) -> Vec<ReviewItem> {
        review(self)
    }

    pub fn topic_position(&self, position: usize) -> Option<TopicPosition> {
        let (block_index, block) = self
            .blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.contains(position))?;

        Some(TopicPosition {
            topic_id: block.topic_id.clone(),
            name: block.name.clone(),
            short_name: block.short_name.clone(),
            current: position - block.start + 1,
            total: block.len,
            block: block_index + 1,
            blocks: self.blocks.len(),
        })
    }

    /// Answered positions as `1A, 3C`.
    pub fn answer_summary(&self) -> String {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(i, a)| {
                a.as_ref()
                    .map(|a| format!("{}{}", i + 1, option_letter(a.selected_index)))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.finished.is_some() {
            return Err(Error::Finished);
        }
        Ok(())
    }

    fn ensure_position(&self, position: usize) -> Result<(), Error> {
        if position >= self.questions.len() {
            return Err(Error::InvalidPosition {
                position,
                len: self.questions.len(),
            });
        }
        Ok(())
    }
}

/// Letter shown next to an option: 0 -> 'A', 1 -> 'B', ...
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map(char::from)
        .unwrap_or('?')
}
