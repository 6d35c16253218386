use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use super::{context::Session, verifier::SessionVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// Re-verification failed; the client should be sent to the login page.
    Expired,
    LoggedOut,
}

/// Background re-verification of an active session on a fixed interval.
/// Ends as `Expired` when a check fails, or as `LoggedOut` when stopped or
/// when the session was purged between checks.
pub struct SessionMonitor {
    status: watch::Receiver<SessionStatus>,
    stop: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl SessionMonitor {
    pub fn spawn(verifier: SessionVerifier, session: Arc<Session>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(SessionStatus::Active);
        let stop = Arc::new(Notify::new());
        let task = tokio::spawn(run(verifier, session, every, tx, stop.clone()));
        Self {
            status: rx,
            stop,
            task: Some(task),
        }
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Ends monitoring. A check already in flight finishes first.
    pub async fn stop(mut self) {
        self.stop.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    verifier: SessionVerifier,
    session: Arc<Session>,
    every: Duration,
    status: watch::Sender<SessionStatus>,
    stop: Arc<Notify>,
) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // A purge between checks means somebody logged out.
    let epoch = session.epoch();

    loop {
        tokio::select! {
            _ = stop.notified() => {
                let _ = status.send(SessionStatus::LoggedOut);
                return;
            }
            _ = ticker.tick() => {
                if session.epoch() != epoch {
                    debug!("session purged since last check");
                    let _ = status.send(SessionStatus::LoggedOut);
                    return;
                }
                match verifier.verify(&session).await {
                    Ok(v) => debug!(user_id = %v.subject.user_id, state = ?v.state, "periodic session check passed"),
                    Err(e) => {
                        info!(error = %e, "periodic session check failed, redirecting to login");
                        let _ = status.send(SessionStatus::Expired);
                        return;
                    }
                }
            }
        }
    }
}
