// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered lifecycle of the manager's background tasks.
//!
//! Members start one at a time; each must signal ready before the next is
//! started. Shutdown cancels every member and awaits them in reverse start
//! order. A member exiting while the group is running shuts the group down.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use volman_core::VolmanError;

/// One-shot notification that a task finished starting up.
#[derive(Debug)]
pub struct ReadySignal {
    tx: oneshot::Sender<()>,
}

impl ReadySignal {
    /// Creates a signal and the receiver observing it.
    pub fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn notify(self) {
        let _ = self.tx.send(());
    }
}

/// A long-running member of a [`Supervisor`].
#[async_trait]
pub trait Task: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Runs until `cancel` fires or the task fails.
    ///
    /// Must call [`ReadySignal::notify`] once startup work is complete.
    /// Returning before that counts as a startup failure.
    async fn run(&self, ready: ReadySignal, cancel: CancellationToken) -> Result<(), VolmanError>;
}

struct Member {
    name: String,
    handle: JoinHandle<Result<(), VolmanError>>,
}

/// Starts tasks in order and stops them in reverse.
#[derive(Default)]
pub struct Supervisor {
    members: Vec<Arc<dyn Task>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member; members start in insertion order.
    pub fn with_member(mut self, task: Arc<dyn Task>) -> Self {
        self.members.push(task);
        self
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// Runs the group until `cancel` fires or a member exits.
    ///
    /// Returns the error of the member that failed, if any.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), VolmanError> {
        let shutdown = cancel.child_token();
        let (exit_tx, mut exit_rx) = mpsc::unbounded_channel::<String>();
        let mut started: Vec<Member> = Vec::with_capacity(self.members.len());

        for task in &self.members {
            let name = task.name().to_string();
            let (ready, ready_rx) = ReadySignal::channel();

            let handle = {
                let task = task.clone();
                let token = shutdown.clone();
                let exit_tx = exit_tx.clone();
                let exit_name = name.clone();
                tokio::spawn(
                    async move {
                        let result = task.run(ready, token).await;
                        let _ = exit_tx.send(exit_name);
                        result
                    }
                    .instrument(info_span!("member", name = %name)),
                )
            };
            info!(member = %name, "starting member");
            started.push(Member {
                name: name.clone(),
                handle,
            });

            tokio::select! {
                signalled = ready_rx => {
                    if signalled.is_ok() {
                        info!(member = %name, "member ready");
                        continue;
                    }
                    let err = match started.pop() {
                        Some(member) => startup_failure(member).await,
                        None => VolmanError::Internal("started member missing".into()),
                    };
                    error!(member = %name, error = %err, "member failed during startup");
                    shutdown.cancel();
                    stop_all(started).await;
                    return Err(err);
                }
                _ = shutdown.cancelled() => {
                    info!(member = %name, "shutdown requested during startup");
                    stop_all(started).await;
                    return Ok(());
                }
            }
        }
        drop(exit_tx);
        info!(members = started.len(), "all members ready");

        let exited = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown signal received");
                None
            }
            Some(name) = exit_rx.recv() => {
                info!(member = %name, "member exited, stopping group");
                Some(name)
            }
        };
        shutdown.cancel();

        let results = stop_all(started).await;
        let mut first_error = None;
        for (name, result) in results {
            if let Err(e) = result {
                if exited.as_deref() == Some(name.as_str()) {
                    return Err(e);
                }
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn startup_failure(member: Member) -> VolmanError {
    match member.handle.await {
        Ok(Err(e)) => e,
        Ok(Ok(())) => VolmanError::Task {
            task: member.name,
            message: "exited before signalling ready".into(),
        },
        Err(e) => VolmanError::Task {
            task: member.name,
            message: e.to_string(),
        },
    }
}

/// Awaits members in reverse start order.
async fn stop_all(started: Vec<Member>) -> Vec<(String, Result<(), VolmanError>)> {
    let mut results = Vec::with_capacity(started.len());
    for member in started.into_iter().rev() {
        let result = match member.handle.await {
            Ok(result) => result,
            Err(e) => Err(VolmanError::Task {
                task: member.name.clone(),
                message: e.to_string(),
            }),
        };
        match &result {
            Ok(()) => info!(member = %member.name, "member stopped"),
            Err(e) => error!(member = %member.name, error = %e, "member stopped with error"),
        }
        results.push((member.name, result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    type Log = Arc<Mutex<Vec<String>>>;

    enum Behaviour {
        RunUntilCancelled,
        FailBeforeReady,
        FailAfterReady,
    }

    struct Probe {
        name: String,
        behaviour: Behaviour,
        log: Log,
    }

    impl Probe {
        fn new(name: &str, behaviour: Behaviour, log: &Log) -> Arc<dyn Task> {
            Arc::new(Self {
                name: name.to_string(),
                behaviour,
                log: log.clone(),
            })
        }

        fn push(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{event}", self.name));
        }
    }

    #[async_trait]
    impl Task for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(
            &self,
            ready: ReadySignal,
            cancel: CancellationToken,
        ) -> Result<(), VolmanError> {
            self.push("start");
            match self.behaviour {
                Behaviour::FailBeforeReady => {
                    return Err(VolmanError::Internal(format!("{} broke", self.name)));
                }
                Behaviour::FailAfterReady => {
                    ready.notify();
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    self.push("fail");
                    return Err(VolmanError::Internal(format!("{} broke", self.name)));
                }
                Behaviour::RunUntilCancelled => ready.notify(),
            }
            cancel.cancelled().await;
            self.push("stop");
            Ok(())
        }
    }

    fn events(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn starts_in_order_and_stops_in_reverse() {
        let log: Log = Arc::default();
        let supervisor = Supervisor::new()
            .with_member(Probe::new("volman-syncer", Behaviour::RunUntilCancelled, &log))
            .with_member(Probe::new("volman-purger", Behaviour::RunUntilCancelled, &log));
        assert_eq!(supervisor.member_names(), vec!["volman-syncer", "volman-purger"]);

        let cancel = CancellationToken::new();
        let run = {
            let cancel = cancel.clone();
            tokio::spawn(async move { supervisor.run(cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        run.await.unwrap().unwrap();

        let events = events(&log);
        assert_eq!(&events[..2], &["volman-syncer:start", "volman-purger:start"]);
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn startup_failure_stops_earlier_members() {
        let log: Log = Arc::default();
        let supervisor = Supervisor::new()
            .with_member(Probe::new("first", Behaviour::RunUntilCancelled, &log))
            .with_member(Probe::new("second", Behaviour::FailBeforeReady, &log))
            .with_member(Probe::new("third", Behaviour::RunUntilCancelled, &log));

        let err = supervisor.run(CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "internal error: second broke");
        assert_eq!(
            events(&log),
            vec!["first:start", "second:start", "first:stop"]
        );
    }

    #[tokio::test]
    async fn member_failure_while_running_shuts_down_group() {
        let log: Log = Arc::default();
        let supervisor = Supervisor::new()
            .with_member(Probe::new("steady", Behaviour::RunUntilCancelled, &log))
            .with_member(Probe::new("flaky", Behaviour::FailAfterReady, &log));

        let err = supervisor.run(CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "internal error: flaky broke");
        assert!(events(&log).contains(&"steady:stop".to_string()));
    }

    #[tokio::test]
    async fn caller_token_is_not_cancelled_by_internal_shutdown() {
        let log: Log = Arc::default();
        let supervisor =
            Supervisor::new().with_member(Probe::new("flaky", Behaviour::FailAfterReady, &log));
        let cancel = CancellationToken::new();

        let _ = supervisor.run(cancel.clone()).await;
        assert!(!cancel.is_cancelled());
    }
}
