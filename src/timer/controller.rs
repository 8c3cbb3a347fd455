use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{lifecycle::FocusLossSink, stickers::StickerStore};

use super::{
    clock::{SessionClock, SystemClock},
    format::format_remaining,
    SessionDuration, SessionPhase, SessionState,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub formatted_remaining: String,
}

struct Countdown {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerInner {
    state: SessionState,
    countdown: Option<Countdown>,
}

impl TimerInner {
    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.token.cancel();
            countdown.handle.abort();
        }
    }
}

/// Owns the focus session and drives its countdown.
///
/// Every public operation takes the same lock, so transitions are
/// serialized. The lock is held while the reward is being persisted, which
/// makes a focus loss arriving at expiry wait for the outcome and then find
/// the session already completed.
#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Mutex<TimerInner>>,
    store: Arc<dyn StickerStore>,
    clock: Arc<dyn SessionClock>,
    poll_interval: Duration,
    updates: Arc<watch::Sender<SessionState>>,
}

impl TimerController {
    pub fn new(store: Arc<dyn StickerStore>) -> Self {
        let (updates, _rx) = watch::channel(SessionState::new());
        Self {
            inner: Arc::new(Mutex::new(TimerInner::default())),
            store,
            clock: Arc::new(SystemClock),
            poll_interval: DEFAULT_POLL_INTERVAL,
            updates: Arc::new(updates),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn SessionClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn store(&self) -> &Arc<dyn StickerStore> {
        &self.store
    }

    /// Receives every published state in order. The terminal update of a
    /// countdown is the last one it sends.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    pub async fn get_state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    /// Current state with remaining time computed at this instant.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        let mut state = guard.state.clone();
        state.remaining_ms = state.remaining_at(self.clock.now()).min(state.remaining_ms);
        SessionSnapshot {
            formatted_remaining: format_remaining(state.remaining_ms),
            state,
        }
    }

    pub async fn select_duration(&self, duration: SessionDuration) -> SessionState {
        let mut inner = self.inner.lock().await;
        if !inner.state.select_duration(duration) {
            log_debug!(
                "ignoring duration change to {} while a session is running",
                duration.label()
            );
            return inner.state.clone();
        }
        self.publish(&inner.state);
        inner.state.clone()
    }

    /// Starts a countdown for the selected duration and returns right away.
    /// Without a selection this does nothing.
    pub async fn start(&self) -> SessionState {
        let mut inner = self.inner.lock().await;
        if inner.state.selected_duration.is_none() {
            log_debug!("start requested without a selected duration");
            return inner.state.clone();
        }

        inner.cancel_countdown();

        let now = self.clock.now();
        let session_id = Uuid::new_v4().to_string();
        inner.state.begin(session_id.clone(), now);

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_countdown(
            self.clone(),
            token.clone(),
            now + self.poll_interval,
        ));
        inner.countdown = Some(Countdown { token, handle });

        log_info!(
            "session {} started for {}",
            session_id,
            inner
                .state
                .selected_duration
                .map(|d| d.label())
                .unwrap_or_default()
        );

        self.publish(&inner.state);
        inner.state.clone()
    }

    /// Forfeits a running session. Anything else is left untouched.
    pub async fn fail(&self) -> SessionState {
        let mut inner = self.inner.lock().await;
        if !inner.state.is_running() {
            log_debug!("focus loss ignored in phase {:?}", inner.state.phase);
            return inner.state.clone();
        }

        inner.cancel_countdown();
        inner.state.fail();
        log_info!(
            "session {} failed: focus lost",
            inner.state.session_id.as_deref().unwrap_or("-")
        );

        self.publish(&inner.state);
        inner.state.clone()
    }

    pub async fn reset(&self) -> SessionState {
        let mut inner = self.inner.lock().await;
        inner.cancel_countdown();
        inner.state.reset();
        self.publish(&inner.state);
        inner.state.clone()
    }

    /// Stops the countdown without touching state, for host teardown.
    pub async fn shutdown(&self) {
        self.inner.lock().await.cancel_countdown();
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.clone());
    }
}

#[async_trait]
impl FocusLossSink for TimerController {
    async fn focus_lost(&self) {
        self.fail().await;
    }
}

async fn run_countdown(controller: TimerController, token: CancellationToken, first_poll: Instant) {
    let mut ticker = time::interval_at(first_poll, controller.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = token.cancelled() => break,
        }

        let mut inner = controller.inner.lock().await;
        if token.is_cancelled() || inner.state.phase != SessionPhase::Running {
            break;
        }

        let remaining = inner.state.remaining_at(controller.clock.now());
        if remaining > 0 {
            inner.state.tick(remaining);
            controller.publish(&inner.state);
            continue;
        }

        let session_id = inner.state.session_id.clone().unwrap_or_default();
        match controller.store.issue().await {
            Ok(sticker) => {
                log_info!(
                    "session {} completed, earned {} {} (#{})",
                    session_id,
                    sticker.emoji,
                    sticker.name,
                    sticker.id
                );
                inner.state.complete(sticker);
                // This task is finishing on its own; detach rather than abort.
                inner.countdown = None;
                controller.publish(&inner.state);
                break;
            }
            Err(err) => {
                if inner.state.last_error.is_none() {
                    log_error!("session {session_id}: failed to store earned sticker: {err:?}");
                } else {
                    log_warn!("session {session_id}: sticker store still failing: {err}");
                }
                inner.state.record_issue_failure(err.to_string());
                controller.publish(&inner.state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stickers::MemoryStickerStore;

    fn controller() -> (Arc<MemoryStickerStore>, TimerController) {
        let store = Arc::new(MemoryStickerStore::new());
        let controller = TimerController::new(store.clone());
        (store, controller)
    }

    async fn wait_for_phase(controller: &TimerController, phase: SessionPhase) -> SessionState {
        let mut rx = controller.subscribe();
        let state = rx.wait_for(|s| s.phase == phase).await.unwrap().clone();
        state
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_is_idle() {
        let (_store, controller) = controller();
        let state = controller.get_state().await;
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.selected_duration, None);
        assert_eq!(state.remaining_ms, 0);
        assert!(state.earned_sticker.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn start_without_duration_is_a_no_op() {
        let (_store, controller) = controller();
        let state = controller.start().await;
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(state.session_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn completes_exactly_at_the_deadline() {
        let (store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        let started = Instant::now();
        let state = controller.start().await;
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.remaining_ms, 5_000);

        let done = wait_for_phase(&controller, SessionPhase::Completed).await;
        assert_eq!(Instant::now() - started, Duration::from_millis(5_000));
        assert_eq!(done.remaining_ms, 0);
        let sticker = done.earned_sticker.expect("completed session carries a sticker");
        assert!(sticker.is_persisted());
        assert_eq!(store.all().await.unwrap(), vec![sticker]);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_time_only_goes_down() {
        let (_store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;
        let mut rx = controller.subscribe();

        let mut last = u64::MAX;
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            if state.phase == SessionPhase::Running {
                assert!(state.remaining_ms <= last);
                last = state.remaining_ms;
            } else {
                assert_eq!(state.phase, SessionPhase::Completed);
                break;
            }
        }
        assert!(last < 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn focus_loss_fails_without_reward() {
        let (store, controller) = controller();
        controller.select_duration(SessionDuration::FifteenMin).await;
        controller.start().await;

        time::sleep(Duration::from_millis(1_000)).await;
        let state = controller.fail().await;
        assert_eq!(state.phase, SessionPhase::Failed);
        assert!(state.earned_sticker.is_none());

        time::sleep(Duration::from_secs(20 * 60)).await;
        assert_eq!(controller.get_state().await.phase, SessionPhase::Failed);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_is_locked_while_running() {
        let (_store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;

        let state = controller.select_duration(SessionDuration::OneHour).await;
        assert_eq!(state.selected_duration, Some(SessionDuration::Test));
        assert_eq!(state.phase, SessionPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_keeps_a_single_countdown() {
        let (store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        let first = controller.start().await;
        time::sleep(Duration::from_millis(50)).await;
        let second = controller.start().await;
        assert_ne!(first.session_id, second.session_id);

        let done = wait_for_phase(&controller, SessionPhase::Completed).await;
        assert_eq!(done.session_id, second.session_id);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_never_completes() {
        let (store, controller) = controller();
        store.set_fail_writes(true);
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;

        time::sleep(Duration::from_millis(6_000)).await;
        let state = controller.get_state().await;
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.remaining_ms, 0);
        assert!(state.earned_sticker.is_none());
        assert!(state.last_error.is_some());
        assert_eq!(store.count().await.unwrap(), 0);

        store.set_fail_writes(false);
        let done = wait_for_phase(&controller, SessionPhase::Completed).await;
        assert!(done.earned_sticker.is_some());
        assert!(done.last_error.is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_after_completion_round_trips() {
        let (_store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;
        wait_for_phase(&controller, SessionPhase::Completed).await;

        let state = controller.reset().await;
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.remaining_ms, 5_000);
        assert!(state.earned_sticker.is_none());
        assert_eq!(state.selected_duration, Some(SessionDuration::Test));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_a_running_countdown() {
        let (store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;
        time::sleep(Duration::from_millis(2_000)).await;

        controller.reset().await;
        time::sleep(Duration::from_secs(10)).await;
        let state = controller.get_state().await;
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.remaining_ms, 5_000);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_after_completion_is_ignored() {
        let (store, controller) = controller();
        controller.select_duration(SessionDuration::Test).await;
        controller.start().await;
        wait_for_phase(&controller, SessionPhase::Completed).await;

        let state = controller.fail().await;
        assert_eq!(state.phase, SessionPhase::Completed);
        assert!(state.earned_sticker.is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_formats_live_remaining() {
        let (_store, controller) = controller();
        controller.select_duration(SessionDuration::FifteenMin).await;
        controller.start().await;
        time::sleep(Duration::from_millis(60_050)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state.remaining_ms, 839_950);
        assert_eq!(snapshot.formatted_remaining, "14:00");
    }

    #[tokio::test(start_paused = true)]
    async fn focus_loss_sink_fails_the_session() {
        let (_store, controller) = controller();
        controller.select_duration(SessionDuration::ThirtyMin).await;
        controller.start().await;

        let sink: &dyn FocusLossSink = &controller;
        sink.focus_lost().await;
        assert_eq!(controller.get_state().await.phase, SessionPhase::Failed);
    }
}
