//! Async monitor service
//!
//! Frames and session controls share one single-consumer queue, so the
//! detector sees them strictly in arrival order. The periodic tick runs as
//! its own task and takes the same lock; it is aborted on pause, reset and
//! finish, and re-checks the session generation under the lock so no tick
//! lands after the control call returns.

use face_landmarks::LandmarkFrame;
use feedback::{FeedbackState, FeedbackTracker};
use session::{SessionRecord, SessionSink, SessionStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::{ChewMonitor, MonitorSnapshot};
use crate::settings::Settings;
use crate::MonitorError;

type Reply<T> = oneshot::Sender<Result<T, MonitorError>>;

enum Command {
    Frame {
        frame: Option<LandmarkFrame>,
        timestamp_ms: u64,
    },
    Start(Reply<SessionStats>),
    Pause(Reply<SessionStats>),
    Reset(Reply<SessionStats>),
    Finish(Reply<SessionRecord>),
}

/// Monitor plus the publishing side of the snapshot channels
struct Shared {
    monitor: ChewMonitor,
    feedback: FeedbackTracker,
    snapshot_tx: watch::Sender<MonitorSnapshot>,
    feedback_tx: watch::Sender<FeedbackState>,
}

impl Shared {
    /// Publish the session snapshot, and feedback when it changed
    fn publish(&mut self) {
        let snapshot = self.monitor.snapshot();
        self.snapshot_tx.send_replace(snapshot);

        if let Some(state) = self
            .feedback
            .update(snapshot.stats.pace, self.monitor.is_tracking())
        {
            self.feedback_tx.send_replace(state);
        }
    }
}

/// Handle to a running monitor
pub struct MonitorService {
    commands: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<MonitorSnapshot>,
    feedback_rx: watch::Receiver<FeedbackState>,
    consumer: JoinHandle<()>,
}

impl MonitorService {
    /// Spawn the consumer task; must be called inside a tokio runtime
    pub fn spawn(
        monitor: ChewMonitor,
        settings: &Settings,
        sink: Option<Arc<dyn SessionSink>>,
    ) -> Self {
        let (commands, rx) = mpsc::channel(settings.frame_queue_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(monitor.snapshot());
        let tracker = FeedbackTracker::new();
        let (feedback_tx, feedback_rx) = watch::channel(tracker.current());

        let shared = Arc::new(Mutex::new(Shared {
            monitor,
            feedback: tracker,
            snapshot_tx,
            feedback_tx,
        }));

        info!(
            "Monitor service started: tick {}ms, queue {}",
            settings.tick_interval_ms, settings.frame_queue_capacity
        );
        let consumer = tokio::spawn(run(shared, rx, settings.tick_interval(), sink));

        Self {
            commands,
            snapshot_rx,
            feedback_rx,
            consumer,
        }
    }

    /// Queue a frame, waiting for room
    pub async fn push_frame(
        &self,
        frame: Option<LandmarkFrame>,
        timestamp_ms: u64,
    ) -> Result<(), MonitorError> {
        self.commands
            .send(Command::Frame {
                frame,
                timestamp_ms,
            })
            .await
            .map_err(|_| MonitorError::Stopped)
    }

    /// Queue a frame, dropping it when the queue is full
    pub fn try_push_frame(
        &self,
        frame: Option<LandmarkFrame>,
        timestamp_ms: u64,
    ) -> Result<(), MonitorError> {
        self.commands
            .try_send(Command::Frame {
                frame,
                timestamp_ms,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => MonitorError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => MonitorError::Stopped,
            })
    }

    pub async fn start(&self) -> Result<SessionStats, MonitorError> {
        self.request(Command::Start).await
    }

    pub async fn pause(&self) -> Result<SessionStats, MonitorError> {
        self.request(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<SessionStats, MonitorError> {
        self.request(Command::Reset).await
    }

    /// End the session and hand its record to the sink
    pub async fn finish(&self) -> Result<SessionRecord, MonitorError> {
        self.request(Command::Finish).await
    }

    /// Session snapshots, updated on every tick, event and control
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Feedback, updated when pace or tracking status changes
    pub fn subscribe_feedback(&self) -> watch::Receiver<FeedbackState> {
        self.feedback_rx.clone()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        *self.snapshot_rx.borrow()
    }

    pub fn feedback(&self) -> FeedbackState {
        *self.feedback_rx.borrow()
    }

    /// Drain queued commands and stop the consumer
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.consumer.await {
            debug!("Monitor consumer ended abnormally: {}", e);
        }
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, MonitorError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| MonitorError::Stopped)?;
        rx.await.map_err(|_| MonitorError::Stopped)?
    }
}

async fn run(
    shared: Arc<Mutex<Shared>>,
    mut rx: mpsc::Receiver<Command>,
    period: Duration,
    sink: Option<Arc<dyn SessionSink>>,
) {
    let mut ticker: Option<JoinHandle<()>> = None;

    while let Some(command) = rx.recv().await {
        let mut state = shared.lock().await;
        match command {
            Command::Frame {
                frame,
                timestamp_ms,
            } => {
                let outcome = state.monitor.push_frame(frame.as_ref(), timestamp_ms);
                if outcome.event().is_some() {
                    state.publish();
                }
            }
            Command::Start(reply) => {
                let result = state.monitor.start();
                if result.is_ok() {
                    stop_ticker(&mut ticker);
                    let generation = state.monitor.generation();
                    ticker = Some(spawn_ticker(shared.clone(), period, generation));
                    state.publish();
                }
                let _ = reply.send(result);
            }
            Command::Pause(reply) => {
                let result = state.monitor.pause();
                if result.is_ok() {
                    stop_ticker(&mut ticker);
                    state.publish();
                }
                let _ = reply.send(result);
            }
            Command::Reset(reply) => {
                stop_ticker(&mut ticker);
                let stats = state.monitor.reset();
                state.publish();
                let _ = reply.send(Ok(stats));
            }
            Command::Finish(reply) => {
                let result = state.monitor.finish(sink.as_deref());
                if result.is_ok() {
                    stop_ticker(&mut ticker);
                    state.publish();
                }
                let _ = reply.send(result);
            }
        }
    }

    stop_ticker(&mut ticker);
    info!("Monitor service stopped");
}

fn stop_ticker(ticker: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = ticker.take() {
        handle.abort();
    }
}

/// Refresh elapsed time and pace every `period` while `generation` is current
fn spawn_ticker(shared: Arc<Mutex<Shared>>, period: Duration, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut state = shared.lock().await;
            if state.monitor.generation() != generation {
                debug!("Tick task outlived generation {}", generation);
                break;
            }
            if state.monitor.tick().is_some() {
                state.publish();
            }
        }
    })
}
