//! Audio study mode
//!
//! Reads a topic aloud, one question after another, in store order. The
//! speech engine lives in the presentation layer; this module decides what
//! to say and where playback goes when an utterance ends.

use std::sync::Arc;

use schema::Question;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{attempt::option_letter, error::Error, store::QuestionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// What the presentation layer should do after an utterance ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStep {
    /// Speak the question at this position next.
    Continue(usize),
    /// The last question was read; playback stopped.
    Done,
}

/// A speech synthesis voice offered by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

#[derive(Clone, Debug)]
pub struct AudioSession {
    topic_name: String,
    questions: Vec<Arc<Question>>,
    current_index: usize,
    read_all_options: bool,
    state: PlaybackState,
}

/// Loads a topic for listening, starting at the 1-based `start_question`.
///
/// `start_question` is clamped into the topic's range.
pub async fn start_audio<S: QuestionStore + ?Sized>(
    store: &S,
    topic_id: &str,
    start_question: usize,
) -> Result<AudioSession, Error> {
    let topic = store.get_topic(topic_id).await?;
    let questions = store.list_questions(topic_id).await?;
    if questions.is_empty() {
        return Err(Error::EmptyResult(topic_id.to_string()));
    }

    let mut session = AudioSession {
        topic_name: topic.name,
        questions: questions.into_iter().map(Arc::new).collect(),
        current_index: 0,
        read_all_options: true,
        state: PlaybackState::Stopped,
    };
    session.start_at(start_question);
    Ok(session)
}

impl AudioSession {
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn read_all_options(&self) -> bool {
        self.read_all_options
    }

    pub fn set_read_all_options(&mut self, read_all_options: bool) {
        self.read_all_options = read_all_options;
    }

    /// Jumps to the 1-based question `number`, clamped into range.
    pub fn start_at(&mut self, number: usize) {
        self.current_index = number.clamp(1, self.questions.len()) - 1;
    }

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Pause when playing, play otherwise.
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Handles the end of the current utterance.
    pub fn on_playback_end(&mut self) -> PlaybackStep {
        if self.state != PlaybackState::Playing {
            return PlaybackStep::Done;
        }
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            debug!(position = self.current_index, "advancing narration");
            PlaybackStep::Continue(self.current_index)
        } else {
            self.state = PlaybackState::Stopped;
            PlaybackStep::Done
        }
    }

    /// Text to speak for the current question.
    pub fn narration(&self) -> String {
        narration(self.current(), self.current_index + 1, self.read_all_options)
    }
}

/// Spoken form of `question` as number `number`.
pub fn narration(question: &Question, number: usize, read_all_options: bool) -> String {
    let mut text = format!("Pregunta {number}: {}", question.text);

    match question.correct_index().filter(|_| read_all_options) {
        Some(correct_index) => {
            for (i, option) in question.options.iter().enumerate() {
                text.push_str(&format!(" Alternativa {}: {option}.", option_letter(i)));
            }
            text.push_str(&format!(
                " La respuesta correcta es la alternativa {}: {}.",
                option_letter(correct_index),
                question.correct_option
            ));
        }
        None if read_all_options => {
            for (i, option) in question.options.iter().enumerate() {
                text.push_str(&format!(" Alternativa {}: {option}.", option_letter(i)));
            }
            text.push_str(&format!(
                " La respuesta correcta es: {}.",
                question.correct_option
            ));
        }
        None => {
            text.push_str(&format!(
                " La respuesta correcta es: {}.",
                question.correct_option
            ));
        }
    }

    text
}

/// Picks a Spanish voice: the saved one if still offered, else a Google
/// voice, else the first Spanish voice.
pub fn pick_voice<'v>(voices: &'v [Voice], saved_name: Option<&str>) -> Option<&'v Voice> {
    let spanish: Vec<&Voice> = voices
        .iter()
        .filter(|v| v.lang.to_lowercase().starts_with("es"))
        .collect();

    saved_name
        .and_then(|name| spanish.iter().find(|v| v.name == name))
        .or_else(|| {
            spanish
                .iter()
                .find(|v| v.name.to_lowercase().contains("google"))
        })
        .or_else(|| spanish.first())
        .copied()
}
