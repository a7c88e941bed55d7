//! # Background Sync Driver
//!
//! The single cooperative task that does the I/O the state machine calls
//! for. The UI holds a [`SyncHandle`]; the driver runs `tokio::select!`
//! over the notice stream, the reconnect timer, and the handle's control
//! channel, feeding each occurrence into the [`SyncAgent`] and executing
//! the commands it returns.
//!
//! The driver never blocks the UI: mutations are applied to the local
//! store synchronously by the handle itself, and only the "something
//! changed" signal crosses the channel.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;

use crate::client::agent::{SyncAgent, SyncCommand, SyncEvent};
use crate::client::backoff::Backoff;
use crate::client::error::ClientError;
use crate::client::health::ConnectionHealth;
use crate::client::local::LocalStore;
use crate::client::transport::{HttpTransport, NoticeStream};
use crate::shared::Document;

/// Control messages from the handle to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMsg {
    /// A mutation was applied to the local store
    Mutated,
    /// The user asked for an immediate reconnect attempt
    Reconnect,
}

/// The UI's interface to the sync agent.
///
/// Cheap to clone. Reads and writes go straight to the local store; the
/// health indicator is a watch channel the UI can render or await.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    local: LocalStore,
    control: mpsc::UnboundedSender<ControlMsg>,
    health: watch::Receiver<ConnectionHealth>,
}

impl SyncHandle {
    /// Current local document
    pub fn document(&self) -> Result<Document, ClientError> {
        self.local.load()
    }

    /// Apply a mutation locally and schedule a background push.
    ///
    /// The mutation is durable in local storage when this returns; whether
    /// the push happens now, later, or after several retries is invisible
    /// here. It is never silently dropped.
    pub fn mutate<F>(&self, mutate: F) -> Result<Document, ClientError>
    where
        F: FnOnce(&mut Document),
    {
        let document = self.local.mutate(mutate)?;
        // A closed channel means the driver is gone; local-only operation
        // is still correct, so the signal loss is fine.
        let _ = self.control.send(ControlMsg::Mutated);
        Ok(document)
    }

    /// Current health indicator value
    pub fn health(&self) -> ConnectionHealth {
        *self.health.borrow()
    }

    /// Watch receiver for health changes, for UIs that want to await them
    pub fn health_changes(&self) -> watch::Receiver<ConnectionHealth> {
        self.health.clone()
    }

    /// Ask the driver to retry the connection now instead of waiting for
    /// the backoff timer
    pub fn reconnect(&self) {
        let _ = self.control.send(ControlMsg::Reconnect);
    }
}

/// The background driver task state
pub struct SyncDriver {
    agent: SyncAgent,
    local: LocalStore,
    transport: Option<HttpTransport>,
    control: mpsc::UnboundedReceiver<ControlMsg>,
    health: watch::Sender<ConnectionHealth>,
    notices: Option<NoticeStream>,
    retry: Option<Pin<Box<Sleep>>>,
    /// UI mutations already fed into the state machine; compared against
    /// the store's epoch so a pull cannot clobber a mutation the driver
    /// has not seen yet
    folded_mutations: u64,
}

impl SyncDriver {
    /// Create a driver and its handle.
    ///
    /// `transport` is `None` for offline-only operation (no server
    /// configured); the driver then only services local mutations.
    pub fn new(
        local: LocalStore,
        transport: Option<HttpTransport>,
        backoff: Backoff,
    ) -> (SyncHandle, SyncDriver) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (health_tx, health_rx) = watch::channel(ConnectionHealth::Disconnected);

        let handle = SyncHandle {
            local: local.clone(),
            control: control_tx,
            health: health_rx,
        };
        let driver = SyncDriver {
            agent: SyncAgent::new(backoff),
            local,
            transport,
            control: control_rx,
            health: health_tx,
            notices: None,
            retry: None,
            folded_mutations: 0,
        };
        (handle, driver)
    }

    /// Read-only view of the agent, for tests
    pub fn agent(&self) -> &SyncAgent {
        &self.agent
    }

    /// Run until every handle is dropped
    pub async fn run(mut self) {
        if self.transport.is_some() {
            self.step(SyncEvent::ServerConfigured).await;
        }

        while let Some(event) = self.next_event().await {
            self.step(event).await;
        }
        tracing::debug!("[Agent] All handles dropped, driver stopping");
    }

    /// Wait for the next external occurrence and map it to an event.
    ///
    /// Returns `None` when the control channel closes (all handles gone).
    async fn next_event(&mut self) -> Option<SyncEvent> {
        let occurrence = tokio::select! {
            msg = self.control.recv() => Occurrence::Control(msg),
            notice = next_notice(&mut self.notices) => Occurrence::Notice(notice),
            _ = wait_retry(&mut self.retry) => Occurrence::RetryDue,
        };

        match occurrence {
            Occurrence::Control(Some(ControlMsg::Mutated)) => {
                self.folded_mutations = self.folded_mutations.saturating_add(1);
                Some(SyncEvent::LocalMutation)
            }
            Occurrence::Control(Some(ControlMsg::Reconnect)) => {
                self.retry = None;
                Some(SyncEvent::RetryTimerFired)
            }
            Occurrence::Control(None) => None,
            Occurrence::Notice(Some(Ok(msg))) => {
                Some(SyncEvent::NoticeReceived { version: msg.version() })
            }
            Occurrence::Notice(Some(Err(e))) => {
                tracing::warn!("[Agent] Subscription failed: {}", e);
                self.notices = None;
                Some(SyncEvent::ConnectionLost)
            }
            Occurrence::Notice(None) => {
                tracing::info!("[Agent] Subscription closed by server");
                self.notices = None;
                Some(SyncEvent::ConnectionLost)
            }
            Occurrence::RetryDue => {
                self.retry = None;
                Some(SyncEvent::RetryTimerFired)
            }
        }
    }

    /// Run one event through the agent, executing commands until the
    /// resulting event chain settles.
    async fn step(&mut self, event: SyncEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            tracing::debug!("[Agent] Event: {:?}", event);
            for command in self.agent.handle(event) {
                if let Some(follow_up) = self.execute(command).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn execute(&mut self, command: SyncCommand) -> Option<SyncEvent> {
        match command {
            SyncCommand::OpenChannel => {
                let transport = self.transport.as_ref()?;
                match transport.subscribe().await {
                    Ok(stream) => {
                        self.notices = Some(stream);
                        Some(SyncEvent::HandshakeSucceeded)
                    }
                    Err(e) => {
                        tracing::warn!("[Agent] Handshake failed: {}", e);
                        Some(SyncEvent::HandshakeFailed)
                    }
                }
            }

            SyncCommand::CloseChannel => {
                self.notices = None;
                None
            }

            SyncCommand::Pull => {
                let transport = self.transport.as_ref()?;
                match transport.fetch().await {
                    Ok(remote) => {
                        let version = remote.version;
                        let pending = self.agent.pending_intent().is_some();
                        let stored =
                            self.local.reconcile_pull(remote, pending, self.folded_mutations);
                        match stored {
                            Ok(_) => {
                                tracing::debug!("[Agent] Pulled v{}", version);
                                Some(SyncEvent::PullSucceeded { version })
                            }
                            Err(e) => {
                                tracing::error!("[Agent] Could not store pulled document: {}", e);
                                Some(SyncEvent::PullFailed)
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("[Agent] Pull failed: {}", e);
                        Some(SyncEvent::PullFailed)
                    }
                }
            }

            SyncCommand::Push => {
                let transport = self.transport.as_ref()?;
                let snapshot = match self.local.load() {
                    Ok(mut document) => {
                        document.strip_device_fields();
                        document
                    }
                    Err(e) => {
                        tracing::error!("[Agent] Could not load document for push: {}", e);
                        return Some(SyncEvent::PushFailed { fatal: false });
                    }
                };

                match transport.push(snapshot).await {
                    Ok(stamped) => {
                        let version = stamped.version;
                        // Adopt the stamp so our own echo (if any) is
                        // recognized as already-seen.
                        if let Err(e) = self.local.update(|doc| doc.version = version) {
                            tracing::error!("[Agent] Could not record pushed version: {}", e);
                        }
                        tracing::debug!("[Agent] Pushed, server stamped v{}", version);
                        Some(SyncEvent::PushSucceeded { version })
                    }
                    Err(ClientError::Rejected { message }) => {
                        tracing::warn!("[Agent] Server rejected push: {}", message);
                        Some(SyncEvent::PushFailed { fatal: true })
                    }
                    Err(e) => {
                        tracing::warn!("[Agent] Push failed: {}", e);
                        Some(SyncEvent::PushFailed { fatal: false })
                    }
                }
            }

            SyncCommand::ScheduleRetry(delay) => {
                tracing::debug!("[Agent] Next reconnect attempt in {:?}", delay);
                self.retry = Some(Box::pin(tokio::time::sleep(delay)));
                None
            }

            SyncCommand::PublishHealth(health) => {
                let _ = self.health.send(health);
                None
            }
        }
    }
}

/// What woke the driver up
enum Occurrence {
    Control(Option<ControlMsg>),
    Notice(Option<Result<crate::shared::ChannelMessage, ClientError>>),
    RetryDue,
}

async fn next_notice(
    notices: &mut Option<NoticeStream>,
) -> Option<Result<crate::shared::ChannelMessage, ClientError>> {
    match notices.as_mut() {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_retry(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
