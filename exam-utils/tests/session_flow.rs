use std::collections::HashSet;

use exam_utils::{
    Question, Topic,
    attempt::{FinishReason, SelectOutcome, SessionKind},
    error::Error,
    generation::{MockExamConfig, QuizMode, start_session},
    store::{InMemoryStore, QuestionStore},
    ticker::LiveSession,
    timer::TimerEvent,
};
use rand::{SeedableRng, rngs::StdRng};

/// The 18 SIECOPOL topics, each with `per_topic` questions. Option "B" is correct.
fn bank(per_topic: usize) -> InMemoryStore {
    let config = MockExamConfig::siecopol();
    let mut topics = vec![];
    let mut questions = vec![];
    for (i, quota) in config.topics.iter().enumerate() {
        topics.push(Topic {
            id: quota.topic_id.clone(),
            name: format!("Tema {}", i + 1),
            short_name: format!("T{}", i + 1),
        });
        for n in 0..per_topic {
            questions.push(Question {
                id: format!("{}_{n:03}", quota.topic_id),
                topic_id: quota.topic_id.clone(),
                text: format!("Pregunta {n}"),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: "B".into(),
                tip: None,
            });
        }
    }
    InMemoryStore::new(topics, questions)
}

fn correct_position(session: &exam_utils::attempt::Session, position: usize) -> usize {
    session
        .question(position)
        .and_then(|q| q.correct_index())
        .unwrap()
}

#[tokio::test]
async fn topic_exam_from_start_to_score() {
    let store = bank(30);
    let mut rng = StdRng::seed_from_u64(2024);
    let mode = QuizMode::TopicExam {
        topic_id: "topic_09".into(),
        count: 10,
    };

    let mut session = start_session(&store, &mode, &mut rng).await.unwrap();
    assert_eq!(session.kind(), SessionKind::TopicExam);
    assert_eq!(session.title(), Some("Tema 9"));

    for position in 0..7 {
        let correct = correct_position(&session, position);
        session.select(position, correct).unwrap();
    }
    let wrong = (correct_position(&session, 7) + 1) % 4;
    session.select(7, wrong).unwrap();
    assert_eq!(session.select(7, wrong).unwrap(), SelectOutcome::AlreadyAnswered);

    let live = session.score();
    assert_eq!((live.correct, live.incorrect, live.unanswered), (7, 1, 2));

    let report = session.finish();
    assert_eq!(report.percentage, 70);
    assert_eq!(report.finish_reason, Some(FinishReason::Manual));
    assert_eq!(session.review().len(), 3);
}

#[tokio::test]
async fn mock_exam_composition_matches_table() {
    let store = bank(15);
    let config = MockExamConfig::siecopol();
    let mut rng = StdRng::seed_from_u64(1);

    let session = start_session(&store, &QuizMode::Mock(config.clone()), &mut rng)
        .await
        .unwrap();

    assert_eq!(session.len(), config.total_questions());
    let mut offset = 0;
    for quota in &config.topics {
        let block = &session.questions()[offset..offset + quota.number_of_questions];
        assert!(block.iter().all(|q| q.topic_id() == quota.topic_id));
        offset += quota.number_of_questions;
    }

    let ids: HashSet<&str> = session.questions().iter().map(|q| q.id()).collect();
    assert_eq!(ids.len(), 100);

    let position = session.topic_position(8).unwrap();
    assert_eq!(position.short_name, "T2");
    assert_eq!((position.current, position.total), (1, 4));
}

#[tokio::test]
async fn mock_exam_needs_every_quota_filled() {
    // topic_09 and topic_10 ask for 12 questions each.
    let store = bank(11);
    let mut rng = StdRng::seed_from_u64(1);

    let err = start_session(&store, &QuizMode::Mock(MockExamConfig::siecopol()), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientQuestions {
            requested: 12,
            available: 11,
            ..
        }
    ));
}

#[tokio::test]
async fn store_sampling_matches_contract() {
    let store = bank(5);

    assert_eq!(store.count_questions("topic_01").await.unwrap(), 5);
    let sample = store.sample_questions("topic_01", 5).await.unwrap();
    let ids: HashSet<String> = sample.into_iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 5);
    assert!(matches!(
        store.sample_questions("topic_01", 6).await,
        Err(Error::InsufficientQuestions { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_finishes_live_mock_exam() {
    let store = bank(15);
    let mut config = MockExamConfig::siecopol();
    config.duration_in_s = 3;
    let mut rng = StdRng::seed_from_u64(1);
    let session = start_session(&store, &QuizMode::Mock(config), &mut rng)
        .await
        .unwrap();

    let mut live = LiveSession::start(session);
    live.session_mut().select(0, 0).unwrap();

    let mut expired = 0;
    let mut ticks = 0;
    while let Some(event) = live.next_tick().await {
        ticks += 1;
        if event == TimerEvent::Expired {
            expired += 1;
        }
    }

    assert_eq!((ticks, expired), (3, 1));
    assert!(matches!(live.session_mut().select(1, 0), Err(Error::Finished)));
    let report = live.finish();
    assert_eq!(report.time_used, 3);
    assert_eq!(report.finish_reason, Some(FinishReason::TimeExpired));
    assert_eq!(report.unanswered, 99);
}
