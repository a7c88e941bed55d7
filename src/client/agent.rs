//! # Connection State Machine
//!
//! The pure core of the sync agent: discrete events in, state transitions
//! and commands out, no I/O anywhere. The background driver performs the
//! network and storage work the commands call for and feeds the outcomes
//! back in as further events, which keeps every transition testable
//! without a server or a runtime.
//!
//! ## States
//!
//! - **Offline** - no server configured; everything stays local
//! - **Connecting** - broadcast-channel handshake in progress
//! - **Connected** - channel live; pushes and pulls flow
//! - **Disconnected** - connection lost; local-only plus a retry timer
//!
//! ## Guarantees
//!
//! - A local mutation is never dropped: it creates or extends the single
//!   pending [`SyncIntent`], which survives every failure and reconnect
//! - At most one push is in flight; mutations during a push re-dirty the
//!   intent and trigger a follow-up push instead of overlapping requests
//! - Every failure path schedules a bounded-backoff reconnect

use std::time::Duration;

use crate::client::backoff::Backoff;
use crate::client::health::ConnectionHealth;
use crate::client::intent::SyncIntent;

/// Agent connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No server configured; local-only operation
    Offline,
    /// Broadcast-channel handshake in progress
    Connecting,
    /// Channel live
    Connected,
    /// Connection lost; waiting to retry
    Disconnected,
}

impl ConnectionState {
    /// Health indicator value for this state
    pub fn health(&self) -> ConnectionHealth {
        match self {
            Self::Connected => ConnectionHealth::Connected,
            _ => ConnectionHealth::Disconnected,
        }
    }
}

/// Discrete inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A server URL was configured; leave Offline
    ServerConfigured,
    /// Broadcast-channel handshake completed
    HandshakeSucceeded,
    /// Broadcast-channel handshake failed or timed out
    HandshakeFailed,
    /// A live connection dropped
    ConnectionLost,
    /// The reconnect timer fired (or a manual reconnect was requested)
    RetryTimerFired,
    /// A mutation was applied to local storage
    LocalMutation,
    /// The server announced a change at this version
    NoticeReceived {
        /// Version carried by the notice
        version: u64,
    },
    /// A push round-trip completed; the server stamped this version
    PushSucceeded {
        /// Version stamped on the accepted document
        version: u64,
    },
    /// A push failed; `fatal` means the server rejected the document
    /// rather than the transport failing
    PushFailed {
        /// Rejection (true) versus transient transport failure (false)
        fatal: bool,
    },
    /// A pull round-trip completed and the result was stored locally
    PullSucceeded {
        /// Version of the pulled document
        version: u64,
    },
    /// A pull failed
    PullFailed,
}

/// Work the driver must perform in response to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Open the broadcast-channel subscription
    OpenChannel,
    /// Drop the broadcast-channel subscription
    CloseChannel,
    /// GET the latest document and reconcile it into local storage
    Pull,
    /// PUT the current local document (device fields stripped)
    Push,
    /// Arm the reconnect timer
    ScheduleRetry(Duration),
    /// Publish a new health indicator value
    PublishHealth(ConnectionHealth),
}

/// The sync agent state machine
#[derive(Debug)]
pub struct SyncAgent {
    state: ConnectionState,
    intent: Option<SyncIntent>,
    push_in_flight: bool,
    dirty_during_push: bool,
    known_version: u64,
    backoff: Backoff,
}

impl SyncAgent {
    /// Create an agent in the Offline state
    pub fn new(backoff: Backoff) -> Self {
        Self {
            state: ConnectionState::Offline,
            intent: None,
            push_in_flight: false,
            dirty_during_push: false,
            known_version: 0,
            backoff,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Health indicator for the current state
    pub fn health(&self) -> ConnectionHealth {
        self.state.health()
    }

    /// The pending intent, if a local mutation is unacknowledged
    pub fn pending_intent(&self) -> Option<&SyncIntent> {
        self.intent.as_ref()
    }

    /// Latest version this client has observed from the server
    pub fn known_version(&self) -> u64 {
        self.known_version
    }

    /// Feed one event through the machine, returning the commands the
    /// driver must execute, in order.
    pub fn handle(&mut self, event: SyncEvent) -> Vec<SyncCommand> {
        use ConnectionState::*;

        match event {
            SyncEvent::ServerConfigured => match self.state {
                Offline => {
                    self.state = Connecting;
                    vec![SyncCommand::OpenChannel]
                }
                _ => Vec::new(),
            },

            SyncEvent::HandshakeSucceeded => match self.state {
                Connecting => {
                    self.state = Connected;
                    self.backoff.reset();
                    // Always pull on (re)connect: no backlog is replayed,
                    // and a pending intent re-pushes after the pull lands.
                    vec![
                        SyncCommand::PublishHealth(ConnectionHealth::Connected),
                        SyncCommand::Pull,
                    ]
                }
                _ => Vec::new(),
            },

            SyncEvent::HandshakeFailed => match self.state {
                Connecting => self.drop_to_disconnected(),
                _ => Vec::new(),
            },

            SyncEvent::ConnectionLost => match self.state {
                Connecting | Connected => self.drop_to_disconnected(),
                _ => Vec::new(),
            },

            SyncEvent::RetryTimerFired => match self.state {
                Disconnected => {
                    self.state = Connecting;
                    vec![SyncCommand::OpenChannel]
                }
                _ => Vec::new(),
            },

            SyncEvent::LocalMutation => {
                match &mut self.intent {
                    Some(intent) => intent.touch(),
                    None => self.intent = Some(SyncIntent::new()),
                }
                if self.push_in_flight {
                    self.dirty_during_push = true;
                    Vec::new()
                } else if self.state == Connected {
                    self.begin_push()
                } else {
                    Vec::new()
                }
            }

            SyncEvent::NoticeReceived { version } => {
                if self.state == Connected && version > self.known_version {
                    vec![SyncCommand::Pull]
                } else {
                    Vec::new()
                }
            }

            SyncEvent::PushSucceeded { version } => {
                self.push_in_flight = false;
                self.known_version = self.known_version.max(version);
                if self.dirty_during_push {
                    // Something changed while the push was on the wire;
                    // the intent lives on and the new state goes out now.
                    self.begin_push()
                } else {
                    self.intent = None;
                    Vec::new()
                }
            }

            SyncEvent::PushFailed { fatal } => {
                self.push_in_flight = false;
                self.dirty_during_push = false;
                if let Some(intent) = &mut self.intent {
                    intent.record_failure(if fatal {
                        "rejected by server"
                    } else {
                        "transport failure"
                    });
                }
                if fatal {
                    // The server refused the document itself; retrying the
                    // same payload cannot help, but the intent stays so
                    // the next mutation re-pushes.
                    Vec::new()
                } else {
                    match self.state {
                        Connecting | Connected => self.drop_to_disconnected(),
                        _ => Vec::new(),
                    }
                }
            }

            SyncEvent::PullSucceeded { version } => {
                self.known_version = self.known_version.max(version);
                if self.intent.is_some() && !self.push_in_flight && self.state == Connected {
                    self.begin_push()
                } else {
                    Vec::new()
                }
            }

            SyncEvent::PullFailed => match self.state {
                Connecting | Connected => self.drop_to_disconnected(),
                _ => Vec::new(),
            },
        }
    }

    fn begin_push(&mut self) -> Vec<SyncCommand> {
        self.push_in_flight = true;
        self.dirty_during_push = false;
        if let Some(intent) = &mut self.intent {
            intent.mark_attempt();
        }
        vec![SyncCommand::Push]
    }

    fn drop_to_disconnected(&mut self) -> Vec<SyncCommand> {
        self.state = ConnectionState::Disconnected;
        self.push_in_flight = false;
        self.dirty_during_push = false;
        let delay = self.backoff.next_delay();
        vec![
            SyncCommand::CloseChannel,
            SyncCommand::PublishHealth(ConnectionHealth::Disconnected),
            SyncCommand::ScheduleRetry(delay),
        ]
    }
}

impl Default for SyncAgent {
    fn default() -> Self {
        Self::new(Backoff::default())
    }
}
