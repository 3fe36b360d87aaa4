//! Wall-clock driver for session timers
//!
//! A `Ticker` is a background task sending one tick per period until it is
//! cancelled. `LiveSession` pairs a `Session` with its ticker and cancels the
//! ticker on every way out: manual finish, countdown expiry, and drop.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{attempt::Session, score::ScoreReport, timer::TimerEvent};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns the tick task on the current tokio runtime.
    ///
    /// The first tick arrives one `period` after spawning.
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<Instant>) {
        let (tx, rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    at = interval.tick() => {
                        if tx.send(at).await.is_err() {
                            break;
                        }
                    }
                }
            }
            trace!("ticker task exited");
        });

        (Self { token, handle }, rx)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// A session being taken, with its clock running.
///
/// Dropping a `LiveSession` is navigating away: the ticker stops and the
/// session is discarded.
#[derive(Debug)]
pub struct LiveSession {
    session: Session,
    ticker: Option<Ticker>,
    ticks: mpsc::Receiver<Instant>,
}

impl LiveSession {
    pub fn start(session: Session) -> Self {
        Self::with_period(session, TICK_PERIOD)
    }

    pub fn with_period(session: Session, period: Duration) -> Self {
        let (ticker, ticks) = Ticker::spawn(period);
        debug!(kind = ?session.kind(), "clock started");
        Self {
            session,
            ticker: Some(ticker),
            ticks,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// For answer, navigation and reset events between ticks.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Waits for the next tick and applies it to the session.
    ///
    /// Returns `None` once the clock has stopped, either because the session
    /// finished or the ticker went away.
    pub async fn next_tick(&mut self) -> Option<TimerEvent> {
        if self.session.is_finished() {
            self.stop();
        }
        self.ticker.as_ref()?;

        if self.ticks.recv().await.is_none() {
            self.stop();
            return None;
        }

        let event = self.session.tick();
        if self.session.is_finished() || event == TimerEvent::Stopped {
            self.stop();
        }
        Some(event)
    }

    /// Ends the attempt manually and releases the clock.
    pub fn finish(mut self) -> ScoreReport {
        self.stop();
        self.session.finish()
    }

    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            debug!("clock stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        attempt::{FinishReason, tests::session},
        generation::{MockExamConfig, QuizMode, TopicQuota, start_session},
        store::fixtures::store,
    };

    async fn countdown_session(duration_in_s: u64) -> Session {
        let config = MockExamConfig {
            duration_in_s,
            topics: vec![TopicQuota {
                topic_id: "topic_01".into(),
                number_of_questions: 2,
            }],
        };
        let store = store(&[("topic_01", 2)]);
        let mut rng = StdRng::seed_from_u64(1);
        start_session(&store, &QuizMode::Mock(config), &mut rng)
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_finishes_exactly_once() {
        let mut live = LiveSession::start(countdown_session(3).await);

        let mut events = vec![];
        while let Some(event) = live.next_tick().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                TimerEvent::Advanced,
                TimerEvent::Advanced,
                TimerEvent::Expired
            ]
        );
        assert!(!live.is_ticking());
        assert_eq!(
            live.session().finish_reason(),
            Some(FinishReason::TimeExpired)
        );
        assert_eq!(live.next_tick().await, None);
        assert_eq!(live.session().timer().seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_countdown_finishes_on_first_tick() {
        let mut live = LiveSession::start(countdown_session(0).await);

        assert_eq!(live.next_tick().await, Some(TimerEvent::Expired));
        assert!(!live.is_ticking());
        assert_eq!(
            live.session().finish_reason(),
            Some(FinishReason::TimeExpired)
        );
        assert_eq!(live.next_tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stopwatch_advances_once_per_period() {
        let mut live = LiveSession::start(session(2));
        let started = Instant::now();

        for _ in 0..5 {
            assert_eq!(live.next_tick().await, Some(TimerEvent::Advanced));
        }

        assert_eq!(live.session().timer().seconds(), 5);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_finish_stops_the_clock() {
        let mut live = LiveSession::start(session(2));
        live.next_tick().await;
        live.session_mut().select(0, 0).unwrap();

        let report = live.finish();
        assert_eq!(report.time_used, 1);
        assert_eq!(report.correct, 1);
        assert_eq!(report.finish_reason, Some(FinishReason::Manual));
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_through_the_session_stops_ticking() {
        let mut live = LiveSession::start(session(2));
        live.session_mut().finish();

        assert_eq!(live.next_tick().await, None);
        assert!(!live.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_ticker_task_exits() {
        let (ticker, mut rx) = Ticker::spawn(TICK_PERIOD);
        assert!(rx.recv().await.is_some());

        ticker.cancel();
        assert!(ticker.is_cancelled());
        assert_eq!(rx.recv().await, None);
        drop(ticker);
    }
}
