//! Background autoplay worker.
//!
//! The worker task owns its [`Session`] outright. Commands and step deadlines
//! are handled in one loop, so steps never overlap, and a stop that has been
//! acknowledged is final: no step runs after [`WorkerHandle::stop`] returns.

use super::autoplay::AutoplayState;
use super::strategy::AutoplayStrategy;
use crate::error::WorkerError;
use crate::session::{Session, SessionSnapshot};
use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

enum Command {
    Start {
        strategy: AutoplayStrategy,
        reply: oneshot::Sender<bool>,
    },
    TogglePause {
        reply: oneshot::Sender<AutoplayState>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

pub struct AutoplayWorker<R> {
    session: Session,
    rng: R,
    command_rx: mpsc::Receiver<Command>,
}

impl<R: Rng + Send + 'static> AutoplayWorker<R> {
    /// Spawn the worker on the current tokio runtime. It exits once every
    /// handle has been dropped.
    pub fn spawn(session: Session, rng: R) -> WorkerHandle {
        let (command_tx, command_rx) = mpsc::channel(16);
        let worker = Self {
            session,
            rng,
            command_rx,
        };
        tokio::spawn(worker.run());
        WorkerHandle { command_tx }
    }

    async fn run(mut self) {
        loop {
            let deadline = self.session.autoplay().next_step_at().map(Instant::from_std);
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = wait_until(deadline) => {
                    let now = Instant::now().into_std();
                    if let Some(outcome) = self.session.tick(now, &mut self.rng) {
                        debug!(?outcome, "autoplay step");
                    }
                }
            }
        }
        debug!("autoplay worker shut down");
    }

    fn handle_command(&mut self, cmd: Command) {
        let now = Instant::now().into_std();
        match cmd {
            Command::Start { strategy, reply } => {
                let started = self.session.start_autoplay(strategy, now);
                if reply.send(started).is_err() {
                    debug!("Start reply channel closed (caller dropped)");
                }
            }
            Command::TogglePause { reply } => {
                let state = self.session.toggle_autoplay_pause(now);
                if reply.send(state).is_err() {
                    debug!("TogglePause reply channel closed (caller dropped)");
                }
            }
            Command::Stop { reply } => {
                self.session.stop_autoplay();
                if reply.send(()).is_err() {
                    debug!("Stop reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.session.take_snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Cloneable control handle for a running [`AutoplayWorker`].
#[derive(Clone)]
pub struct WorkerHandle {
    command_tx: mpsc::Sender<Command>,
}

impl WorkerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| WorkerError::Closed)?;
        rx.await.map_err(|_| WorkerError::Closed)
    }

    /// Start a run. `Ok(false)` when the session has no weapon selected.
    pub async fn start(&self, strategy: AutoplayStrategy) -> Result<bool, WorkerError> {
        self.request(|reply| Command::Start { strategy, reply }).await
    }

    pub async fn toggle_pause(&self) -> Result<AutoplayState, WorkerError> {
        self.request(|reply| Command::TogglePause { reply }).await
    }

    /// Stop the run and wait until the worker has acknowledged it.
    pub async fn stop(&self) -> Result<(), WorkerError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, WorkerError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}
