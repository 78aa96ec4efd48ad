//! # RemoteAuth Protocol Library
//!
//! This crate provides the wire messages and cryptographic primitives for
//! the RemoteAuth QR-login handshake.
//!
//! ## Overview
//!
//! The protocol crate is the foundation of the client, providing:
//!
//! - **Message Definitions**: the fixed opcode set exchanged with the
//!   remote-auth gateway, serialized as JSON text
//! - **Session Keys**: ephemeral 2048-bit RSA key pairs with OAEP/SHA-256
//!   decryption, one per connection attempt
//! - **Nonce Proof**: the base64url SHA-256 proof sent back to the gateway
//! - **Account Parsing**: the colon-delimited identity record delivered once
//!   a login is approved
//!
//! ## Handshake
//!
//! ```text
//! gateway → hello(heartbeat_interval, timeout_ms)
//! client  → init(encoded_public_key)
//! gateway → nonce_proof(encrypted_nonce)
//! client  → nonce_proof(proof)
//! gateway → pending_remote_init(fingerprint)     scannable code shown
//! gateway → pending_finish(encrypted_user_payload)
//! gateway → finish(encrypted_token)              terminal
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{nonce_proof, ClientMessage, ServerMessage};
//!
//! // Parse an inbound gateway message
//! let hello = ServerMessage::from_json(
//!     r#"{"op":"hello","heartbeat_interval":30000,"timeout_ms":60000}"#,
//! ).unwrap();
//! assert_eq!(hello.op(), "hello");
//!
//! // Build the proof reply for a decrypted nonce
//! let reply = ClientMessage::NonceProof {
//!     proof: nonce_proof(b"decrypted nonce bytes"),
//! };
//! let wire = reply.to_json().unwrap();
//! assert!(wire.contains("\"op\":\"nonce_proof\""));
//! ```
//!
//! ## Modules
//!
//! - [`messages`]: wire message definitions
//! - [`crypto`]: session keys and the nonce proof
//! - [`account`]: identity record parsing
//! - [`error`]: error types

pub mod account;
pub mod crypto;
pub mod error;
pub mod messages;

pub use account::{Account, AVATAR_CDN};
pub use crypto::{nonce_proof, SessionKeys, KEY_BITS};
pub use error::{ProtocolError, Result};
pub use messages::{ClientMessage, ServerMessage};
