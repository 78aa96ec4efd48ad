//! The remote-auth handshake engine.
//!
//! Drives one fixed opcode sequence against the gateway: `hello` → `init` →
//! `nonce_proof` → `pending_remote_init` → `pending_finish` → `finish`.
//! Timeout and cancel tear the attempt down and start a fresh one with new
//! key material; `finish` is terminal. All session mutation happens on one
//! run loop: inbound messages and timer fires are arms of a single
//! `select!`, so nothing touches a session concurrently.

use std::time::Duration;

use protocol::error::{ProtocolError, Result};
use protocol::{nonce_proof, Account, ClientMessage, ServerMessage, SessionKeys};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};

use crate::config::{login_url, ClientConfig};
use crate::qr;
use crate::transport::{Channel, GatewayTransport, Transport};

/// Lifecycle events delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Scannable login code as a PNG data URI.
    QrCode(String),
    /// Identity record of the approving account.
    User(Account),
    /// Session credential; the handshake is complete.
    Token(String),
    /// The gateway-imposed deadline passed; a fresh attempt is starting.
    Timeout,
    /// The login was declined on the approving device; a fresh attempt is
    /// starting.
    Cancel,
}

/// Handshake phases, in order of progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No attempt running yet.
    Idle,
    /// Opening the gateway connection.
    Connecting,
    /// Connected, waiting for `hello`.
    AwaitingHello,
    /// `init` sent, waiting for the nonce challenge.
    AwaitingNonceProof,
    /// Proof sent, waiting for the approving device.
    AwaitingRemoteApproval,
    /// `finish` delivered the credential.
    Completed,
    /// Tearing down after timeout or cancel; a new attempt follows.
    Restarting,
}

/// One connection attempt: key material, channel, and timers.
///
/// Never reused — every restart drops the whole value and allocates a new
/// one, fresh keys included, so nothing leaks between attempts.
struct Session {
    keys: SessionKeys,
    channel: Channel,
    /// Repeating heartbeat, armed by `hello`.
    heartbeat: Option<Interval>,
    /// One-shot attempt deadline, armed once by `hello` and never refreshed.
    deadline: Option<Instant>,
    started_at: Instant,
}

impl Session {
    /// Disarms both timers and closes the channel. Idempotent: safe if a
    /// timer already fired, was never armed, or the channel is closed.
    fn teardown(&mut self) {
        self.heartbeat = None;
        self.deadline = None;
        self.channel.close();
    }
}

/// What a finished attempt asks the run loop to do next.
enum AttemptOutcome {
    /// `finish` delivered the token; the handshake is over.
    Done,
    /// Timeout or cancel; discard the session and start over.
    Restart,
}

/// One select! resolution inside an attempt.
enum Step {
    TimeoutFired,
    HeartbeatDue,
    Inbound(Option<Result<String>>),
}

/// Client for the QR-login handshake.
///
/// Construct with [`AuthClient::new`], take the event receiver with
/// [`AuthClient::events`], then drive the handshake with
/// [`AuthClient::run`].
pub struct AuthClient<T = GatewayTransport> {
    config: ClientConfig,
    transport: T,
    state: EngineState,
    event_tx: mpsc::Sender<AuthEvent>,
    event_rx: Option<mpsc::Receiver<AuthEvent>>,
}

impl AuthClient<GatewayTransport> {
    /// Creates a client that connects over the WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, GatewayTransport)
    }
}

impl<T: Transport> AuthClient<T> {
    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);

        Self {
            config,
            transport,
            state: EngineState::Idle,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn events(&mut self) -> Option<mpsc::Receiver<AuthEvent>> {
        self.event_rx.take()
    }

    /// Current handshake phase.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Runs handshake attempts until one completes.
    ///
    /// Timeout and cancel restart with a fresh session. A connect failure or
    /// a protocol fault (bad ciphertext, malformed identity payload, dead
    /// connection) ends the run with an error; the `Token` event has been
    /// emitted by the time this returns `Ok`.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.attempt().await? {
                AttemptOutcome::Done => return Ok(()),
                AttemptOutcome::Restart => self.set_state(EngineState::Restarting),
            }
        }
    }

    /// Runs a single attempt from fresh keys to a terminal outcome.
    async fn attempt(&mut self) -> Result<AttemptOutcome> {
        let keys = SessionKeys::generate()?;

        self.set_state(EngineState::Connecting);
        let channel = self
            .transport
            .connect(&self.config.gateway_url, &self.config.origin)
            .await?;

        let mut session = Session {
            keys,
            channel,
            heartbeat: None,
            deadline: None,
            started_at: Instant::now(),
        };
        self.set_state(EngineState::AwaitingHello);

        let outcome = self.drive(&mut session).await;
        session.teardown();
        outcome
    }

    /// Serializes inbound messages and timer fires for one session.
    async fn drive(&mut self, session: &mut Session) -> Result<AttemptOutcome> {
        loop {
            // Split borrows: the timer arms and the channel arm each take a
            // disjoint piece of the session.
            let step = {
                let Session {
                    heartbeat,
                    deadline,
                    channel,
                    ..
                } = &mut *session;

                let heartbeat_due = async {
                    match heartbeat.as_mut() {
                        Some(interval) => {
                            interval.tick().await;
                        }
                        None => std::future::pending().await,
                    }
                };
                let timeout_fired = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(*at).await,
                        None => std::future::pending().await,
                    }
                };

                tokio::select! {
                    _ = timeout_fired => Step::TimeoutFired,
                    _ = heartbeat_due => Step::HeartbeatDue,
                    inbound = channel.recv() => Step::Inbound(inbound),
                }
            };

            match step {
                Step::TimeoutFired => {
                    tracing::info!(
                        elapsed = ?session.started_at.elapsed(),
                        "handshake deadline passed"
                    );
                    self.emit(AuthEvent::Timeout).await;
                    return Ok(AttemptOutcome::Restart);
                }
                Step::HeartbeatDue => {
                    self.send(session, &ClientMessage::Heartbeat).await?;
                }
                Step::Inbound(None) => {
                    return Err(ProtocolError::ConnectionClosed(
                        "gateway stream ended".to_string(),
                    ));
                }
                Step::Inbound(Some(Err(e))) => return Err(e),
                Step::Inbound(Some(Ok(text))) => match ServerMessage::from_json(&text) {
                    Ok(message) => {
                        if let Some(outcome) = self.handle_message(session, message).await? {
                            return Ok(outcome);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, raw = %text, "ignoring unrecognized gateway message");
                    }
                },
            }
        }
    }

    /// Applies one gateway message to the session.
    async fn handle_message(
        &mut self,
        session: &mut Session,
        message: ServerMessage,
    ) -> Result<Option<AttemptOutcome>> {
        tracing::debug!(op = message.op(), "gateway message");

        match message {
            ServerMessage::Hello {
                heartbeat_interval,
                timeout_ms,
            } => {
                let period = Duration::from_millis(heartbeat_interval);
                // First tick after one full period, then repeating.
                session.heartbeat = Some(interval_at(Instant::now() + period, period));
                // Armed exactly once per attempt; later traffic never
                // refreshes it.
                session.deadline = Some(Instant::now() + Duration::from_millis(timeout_ms));

                let init = ClientMessage::Init {
                    encoded_public_key: session.keys.encoded_public_key().to_string(),
                };
                self.send(session, &init).await?;
                self.set_state(EngineState::AwaitingNonceProof);
            }
            ServerMessage::NonceProof { encrypted_nonce } => {
                let nonce = session.keys.decrypt(&encrypted_nonce)?;
                let reply = ClientMessage::NonceProof {
                    proof: nonce_proof(&nonce),
                };
                self.send(session, &reply).await?;
                self.set_state(EngineState::AwaitingRemoteApproval);
            }
            ServerMessage::PendingRemoteInit { fingerprint } => {
                let url = login_url(&fingerprint);
                let code = qr::data_uri(&url)?;
                if tracing::enabled!(tracing::Level::DEBUG) {
                    if let Ok(rendered) = qr::terminal_string(&url) {
                        tracing::debug!("scan to approve:\n{}", rendered);
                    }
                }
                self.emit(AuthEvent::QrCode(code)).await;
            }
            ServerMessage::PendingFinish {
                encrypted_user_payload,
            } => {
                let raw = session.keys.decrypt_text(&encrypted_user_payload)?;
                let account = Account::parse(&raw)?;
                self.emit(AuthEvent::User(account)).await;
            }
            ServerMessage::Finish { encrypted_token } => {
                let token = session.keys.decrypt_text(&encrypted_token)?;
                self.emit(AuthEvent::Token(token)).await;
                self.set_state(EngineState::Completed);
                return Ok(Some(AttemptOutcome::Done));
            }
            ServerMessage::Cancel => {
                tracing::info!("login declined by the approving device");
                self.emit(AuthEvent::Cancel).await;
                return Ok(Some(AttemptOutcome::Restart));
            }
        }

        Ok(None)
    }

    /// Serializes and queues an outbound message on the session's channel.
    async fn send(&self, session: &Session, message: &ClientMessage) -> Result<()> {
        tracing::debug!(op = message.op(), "sending");
        session.channel.send(message.to_json()?).await
    }

    /// Delivers an event to the consumer.
    async fn emit(&self, event: AuthEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::warn!(error = %e, "dropping event - receiver is gone");
        }
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "state change");
            self.state = state;
        }
    }
}
