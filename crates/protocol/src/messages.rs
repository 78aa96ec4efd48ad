//! Wire message definitions for the remote-auth gateway.
//!
//! Messages are JSON text carrying a single `op` tag plus opcode-specific
//! fields merged at the top level. Incoming and outgoing sets are separate
//! enums because the same opcode can carry different fields per direction:
//! `nonce_proof` holds `encrypted_nonce` inbound but `proof` outbound.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Messages sent from the client to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announces the attempt's public key after `hello`.
    Init {
        /// Base64-encoded SPKI DER public key.
        encoded_public_key: String,
    },
    /// Keep-alive, sent on the interval the gateway set in `hello`.
    Heartbeat,
    /// Proof of possession of the private key.
    NonceProof {
        /// base64url SHA-256 digest of the decrypted nonce.
        proof: String,
    },
}

/// Messages received from the gateway.
///
/// Anything with an opcode outside this set fails to deserialize and is
/// ignored by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every connection; sets the timer parameters.
    Hello {
        /// Milliseconds between client heartbeats.
        heartbeat_interval: u64,
        /// Milliseconds until the whole attempt expires.
        timeout_ms: u64,
    },
    /// Challenge encrypted to the attempt's public key.
    NonceProof {
        /// Base64 RSA-OAEP ciphertext of the nonce.
        encrypted_nonce: String,
    },
    /// A login attempt is pending; carries the token for the scannable URL.
    PendingRemoteInit {
        /// Opaque token identifying this pending login.
        fingerprint: String,
    },
    /// The approving device confirmed; carries the identity record.
    PendingFinish {
        /// Base64 RSA-OAEP ciphertext of the colon-delimited account payload.
        encrypted_user_payload: String,
    },
    /// Final message; carries the session credential.
    Finish {
        /// Base64 RSA-OAEP ciphertext of the token.
        encrypted_token: String,
    },
    /// The login was declined on the approving device.
    Cancel,
}

impl ClientMessage {
    /// The wire opcode tag, for logging.
    pub fn op(&self) -> &'static str {
        match self {
            ClientMessage::Init { .. } => "init",
            ClientMessage::Heartbeat => "heartbeat",
            ClientMessage::NonceProof { .. } => "nonce_proof",
        }
    }

    /// Serializes this message to its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerMessage {
    /// The wire opcode tag, for logging.
    pub fn op(&self) -> &'static str {
        match self {
            ServerMessage::Hello { .. } => "hello",
            ServerMessage::NonceProof { .. } => "nonce_proof",
            ServerMessage::PendingRemoteInit { .. } => "pending_remote_init",
            ServerMessage::PendingFinish { .. } => "pending_finish",
            ServerMessage::Finish { .. } => "finish",
            ServerMessage::Cancel => "cancel",
        }
    }

    /// Parses a gateway message from its JSON wire form.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
