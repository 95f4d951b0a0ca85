//! Real-time scheduler - one task owns the simulation and fires it on an interval
//!
//! Commands arrive over a channel and run between ticks, so a tick is never
//! interleaved with anything else. Narration and save writes run on their
//! own spawned tasks; narration results come back over a channel and are
//! appended to the log between ticks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::command::executor::{Command, CommandExecutor, ExecutionResult};
use crate::core::error::{CivError, Result};
use crate::llm::narrator::{narrate, Narration, Narrator};
use crate::persistence::snapshot::Session;
use crate::persistence::store::{SaveDebouncer, SaveStore};
use crate::simulation::events::LogEntry;
use crate::simulation::state::{Simulation, StatusView};
use crate::simulation::tick::FireOutcome;

/// Read-only look at the simulation, run between ticks
type Query = Box<dyn FnOnce(&Simulation) + Send>;

enum Request {
    Execute {
        command: Command,
        reply: oneshot::Sender<ExecutionResult>,
    },
    Query(Query),
}

/// Driver-side handle to a running scheduler
pub struct SchedulerHandle {
    requests: mpsc::Sender<Request>,
    status: watch::Receiver<StatusView>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Session>,
}

impl SchedulerHandle {
    /// Start the scheduler on the current tokio runtime
    pub fn spawn<N: Narrator>(session: Session, narrator: Arc<N>) -> Self {
        let (requests, request_rx) = mpsc::channel(64);
        let (status_tx, status) = watch::channel(session.simulation.status());
        let (shutdown, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(session, narrator, request_rx, status_tx, shutdown_rx));

        Self {
            requests,
            status,
            shutdown,
            task,
        }
    }

    /// Run a command between ticks and wait for its result
    pub async fn execute(&self, command: Command) -> Result<ExecutionResult> {
        let (reply, result) = oneshot::channel();
        self.requests
            .send(Request::Execute { command, reply })
            .await
            .map_err(|_| CivError::SchedulerStopped)?;
        result.await.map_err(|_| CivError::SchedulerStopped)
    }

    /// Read something from the simulation between ticks
    pub async fn query<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Simulation) -> T + Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let query: Query = Box::new(move |sim| {
            let _ = reply.send(f(sim));
        });
        self.requests
            .send(Request::Query(query))
            .await
            .map_err(|_| CivError::SchedulerStopped)?;
        result.await.map_err(|_| CivError::SchedulerStopped)
    }

    pub async fn recent_log(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query(move |sim| sim.state.log.recent(limit).to_vec())
            .await
    }

    /// Latest published status
    pub fn status(&self) -> StatusView {
        self.status.borrow().clone()
    }

    /// Receiver that wakes on every status change
    pub fn subscribe(&self) -> watch::Receiver<StatusView> {
        self.status.clone()
    }

    /// Stop the loop and hand the session back
    ///
    /// Pending changes are written before returning.
    pub async fn shutdown(self) -> Result<Session> {
        // The loop may already have stopped; the join below tells us
        let _ = self.shutdown.send(());
        self.task.await.map_err(|_| CivError::SchedulerStopped)
    }
}

async fn run<N: Narrator>(
    mut session: Session,
    narrator: Arc<N>,
    mut requests: mpsc::Receiver<Request>,
    status: watch::Sender<StatusView>,
    mut shutdown: oneshot::Receiver<()>,
) -> Session {
    let config = session.simulation.config().clone();
    let store = config.save_path.clone().map(SaveStore::new);
    let mut debouncer = SaveDebouncer::new(Duration::from_millis(config.save_debounce_ms));

    let (narration_tx, mut narrations) = mpsc::unbounded_channel::<Narration>();
    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(session = %session.id, "Scheduler started");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                if let FireOutcome::Ticked(_) = session.simulation.fire() {
                    debouncer.mark_dirty(Instant::now());
                }
            }
            Some(request) = requests.recv() => match request {
                Request::Execute { command, reply } => {
                    let result = CommandExecutor::execute(&mut session.simulation, &command);
                    if result.is_ok() && command.changes_state() {
                        debouncer.mark_dirty(Instant::now());
                    }
                    let _ = reply.send(result);
                }
                Request::Query(query) => query(&session.simulation),
            },
            Some(narration) = narrations.recv() => {
                record(&mut session.simulation, narration);
                debouncer.mark_dirty(Instant::now());
            }
        }

        dispatch_narratives(&mut session.simulation, &narrator, &narration_tx);
        status.send_replace(session.simulation.status());

        if let Some(store) = &store {
            if debouncer.take_due(Instant::now()) {
                let store = store.clone();
                let snapshot = session.snapshot();
                tokio::spawn(async move {
                    if let Err(e) = store.write(&snapshot).await {
                        tracing::warn!("Save failed: {}", e);
                    }
                });
            }
        }
    }

    if let Some(store) = &store {
        if debouncer.is_dirty() {
            if let Err(e) = store.write(&session.snapshot()).await {
                tracing::warn!("Final save failed: {}", e);
            }
        }
    }
    tracing::info!(session = %session.id, tick = session.simulation.tick(), "Scheduler stopped");
    session
}

/// Hand queued narrative requests to the narrator, one task each
fn dispatch_narratives<N: Narrator>(
    sim: &mut Simulation,
    narrator: &Arc<N>,
    results: &mpsc::UnboundedSender<Narration>,
) {
    for request in sim.drain_narrative_requests() {
        let narrator = Arc::clone(narrator);
        let results = results.clone();
        tokio::spawn(async move {
            if let Some(narration) = narrate(narrator.as_ref(), &request).await {
                let _ = results.send(narration);
            }
        });
    }
}

fn record(sim: &mut Simulation, narration: Narration) {
    match narration {
        Narration::Text(text) => sim.record_narrative(text),
        Narration::Image(uri) => sim.record_narrative(format!("Empire snapshot: {}", uri)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::error::Result;
    use crate::core::types::{BuildingStyle, Era};
    use crate::llm::context::EmpireContext;
    use crate::llm::narrator::SilentNarrator;
    use crate::simulation::crisis::Crisis;
    use crate::simulation::events::LogKind;

    struct EchoNarrator;

    impl Narrator for EchoNarrator {
        async fn chronicle(&self, context: &EmpireContext) -> Result<Option<String>> {
            Ok(Some(format!("Chronicle of the {}", context.era)))
        }

        async fn era_transition(&self, era: Era) -> Result<Option<String>> {
            Ok(Some(format!("Welcome to the {}", era)))
        }

        async fn crisis_log(&self, crisis: &Crisis, _solved: bool) -> Result<Option<String>> {
            Ok(Some(crisis.name.clone()))
        }

        async fn empire_snapshot(
            &self,
            _context: &EmpireContext,
            _style: BuildingStyle,
        ) -> Result<Option<String>> {
            Ok(Some("https://img/empire.png".into()))
        }
    }

    fn fast_config() -> SimulationConfig {
        SimulationConfig {
            tick_interval_ms: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ticks_and_commands_share_one_owner() {
        let handle = SchedulerHandle::spawn(Session::new(fast_config()), Arc::new(SilentNarrator));

        let result = handle.execute(Command::Gather).await.unwrap();
        assert!(result.is_ok());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.status().tick > 0);

        let session = handle.shutdown().await.unwrap();
        assert!(session.simulation.tick() > 0);
        assert!(session.simulation.state.resources.gold >= 1.0);
    }

    #[tokio::test]
    async fn test_subscribers_see_new_ticks() {
        let handle = SchedulerHandle::spawn(Session::new(fast_config()), Arc::new(SilentNarrator));
        let mut status = handle.subscribe();

        let seen = tokio::time::timeout(Duration::from_secs(2), status.wait_for(|s| s.tick >= 3))
            .await
            .expect("ticks within two seconds")
            .map(|s| s.tick)
            .unwrap();
        assert!(seen >= 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_narration_lands_in_log() {
        let handle = SchedulerHandle::spawn(Session::new(fast_config()), Arc::new(EchoNarrator));

        handle.execute(Command::Chronicle).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let log = handle.recent_log(10).await.unwrap();
        assert!(log
            .iter()
            .any(|e| e.kind == LogKind::Ai && e.text == "Chronicle of the Tribal Age"));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_writes_pending_save() {
        let path = std::env::temp_dir().join(format!("civ-sched-{}.json", uuid::Uuid::new_v4()));
        let config = SimulationConfig {
            save_path: Some(path.clone()),
            save_debounce_ms: 60_000,
            ..fast_config()
        };
        let handle = SchedulerHandle::spawn(Session::new(config), Arc::new(SilentNarrator));

        handle.execute(Command::Gather).await.unwrap();
        let session = handle.shutdown().await.unwrap();

        let saved = crate::persistence::snapshot::SaveSnapshot::load(&path).unwrap();
        assert_eq!(saved.session_id, session.id);
        assert_eq!(saved.game_time, session.simulation.tick());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_running_game_saves_before_shutdown() {
        let path = std::env::temp_dir().join(format!("civ-sched-{}.json", uuid::Uuid::new_v4()));
        let config = SimulationConfig {
            tick_interval_ms: 10,
            save_path: Some(path.clone()),
            save_debounce_ms: 40,
            ..Default::default()
        };
        let handle = SchedulerHandle::spawn(Session::new(config), Arc::new(SilentNarrator));

        // Every tick marks the game dirty, so there is never a quiet period
        let mut saved = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if path.exists() {
                saved = true;
                break;
            }
        }
        assert!(saved, "no save written while ticking");
        assert!(handle.status().tick > 0);

        handle.shutdown().await.unwrap();
        std::fs::remove_file(path).ok();
    }
}
