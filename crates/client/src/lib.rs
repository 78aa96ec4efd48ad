//! # RemoteAuth Client Library
//!
//! QR-code remote login against the vendor's remote-auth gateway. A device
//! running this client connects, shows a scannable code, and — once a second,
//! already-authenticated device approves the login — receives the account's
//! identity record and a session credential.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                  AuthClient                   │
//! │  one session per attempt: fresh RSA keys,     │
//! │  fresh channel, heartbeat + deadline timers   │
//! ├───────────────────────────────────────────────┤
//! │   protocol: opcodes · OAEP keys · accounts    │
//! ├───────────────────────────────────────────────┤
//! │    transport: WebSocket (tokio-tungstenite)   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Lifecycle events (`QrCode`, `User`, `Token`, `Timeout`, `Cancel`) arrive
//! on an event channel; transport and crypto faults are the `Err` of
//! [`AuthClient::run`], kept apart from the event stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use client::{AuthClient, AuthEvent, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = AuthClient::new(ClientConfig::default());
//!     let mut events = client.events().expect("receiver taken once");
//!
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             match event {
//!                 AuthEvent::QrCode(code) => println!("scan: {}", code),
//!                 AuthEvent::Token(token) => println!("token: {}", token),
//!                 _ => {}
//!             }
//!         }
//!     });
//!
//!     client.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: the handshake state machine and its timers
//! - [`transport`]: the duplex channel contract and WebSocket adapter
//! - [`qr`]: scannable-code rendering
//! - [`config`]: gateway endpoints and client configuration

pub mod config;
pub mod engine;
pub mod qr;
pub mod transport;

// Re-export protocol for convenience
pub use protocol;

// Re-export config types for convenience
pub use config::{login_url, ClientConfig, GATEWAY_ORIGIN, GATEWAY_URL, LOGIN_URL_BASE};

// Re-export engine types for convenience
pub use engine::{AuthClient, AuthEvent, EngineState};

// Re-export transport types for convenience
pub use transport::{Channel, GatewayTransport, Transport};
