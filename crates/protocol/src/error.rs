//! Error types for the protocol crate.

use thiserror::Error;

/// Protocol error type covering all possible failure modes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    // Serialization errors
    /// Failed to serialize a message.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize a message.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    // Cryptographic errors
    /// Key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Key could not be encoded (DER/PEM).
    #[error("key encoding failed: {0}")]
    KeyEncoding(String),

    /// Decryption operation failed.
    #[error("decryption failed: {0}")]
    Decryption(String),

    // Payload errors
    /// Account payload did not have the expected field count.
    #[error("malformed account payload: expected 4 colon-delimited fields, got {fields}")]
    MalformedAccount {
        /// Number of fields actually present.
        fields: usize,
    },

    /// Decrypted payload was not valid text.
    #[error("payload is not valid text: {0}")]
    PayloadEncoding(String),

    /// Scannable-code rendering failed.
    #[error("qr encoding failed: {0}")]
    QrEncoding(String),

    // Connection errors
    /// WebSocket upgrade or connection establishment failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// Connection was closed unexpectedly.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

// Conversions from underlying crate errors

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_eof() || err.is_syntax() {
            ProtocolError::Deserialization(err.to_string())
        } else {
            ProtocolError::Serialization(err.to_string())
        }
    }
}

impl From<base64::DecodeError> for ProtocolError {
    fn from(err: base64::DecodeError) -> Self {
        ProtocolError::Decryption(err.to_string())
    }
}

impl From<rsa::Error> for ProtocolError {
    fn from(err: rsa::Error) -> Self {
        ProtocolError::Decryption(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ProtocolError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ProtocolError::PayloadEncoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_display() {
        let err = ProtocolError::Serialization("invalid utf-8".to_string());
        assert_eq!(err.to_string(), "serialization failed: invalid utf-8");
    }

    #[test]
    fn test_deserialization_error_display() {
        let err = ProtocolError::Deserialization("unexpected end of input".to_string());
        assert_eq!(
            err.to_string(),
            "deserialization failed: unexpected end of input"
        );
    }

    #[test]
    fn test_decryption_error_display() {
        let err = ProtocolError::Decryption("invalid padding".to_string());
        assert_eq!(err.to_string(), "decryption failed: invalid padding");
    }

    #[test]
    fn test_malformed_account_error_display() {
        let err = ProtocolError::MalformedAccount { fields: 3 };
        assert_eq!(
            err.to_string(),
            "malformed account payload: expected 4 colon-delimited fields, got 3"
        );
    }

    #[test]
    fn test_handshake_failed_error_display() {
        let err = ProtocolError::HandshakeFailed("bad origin".to_string());
        assert_eq!(err.to_string(), "handshake failed: bad origin");
    }

    #[test]
    fn test_connection_closed_error_display() {
        let err = ProtocolError::ConnectionClosed("peer disconnected".to_string());
        assert_eq!(err.to_string(), "connection closed: peer disconnected");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let protocol_err: ProtocolError = json_err.into();
        assert!(matches!(protocol_err, ProtocolError::Deserialization(_)));
    }

    #[test]
    fn test_from_base64_error() {
        let b64_err = {
            use base64::Engine as _;
            base64::engine::general_purpose::STANDARD
                .decode("not base64!!!")
                .unwrap_err()
        };
        let protocol_err: ProtocolError = b64_err.into();
        assert!(matches!(protocol_err, ProtocolError::Decryption(_)));
    }

    #[test]
    fn test_from_utf8_error() {
        let utf8_err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let protocol_err: ProtocolError = utf8_err.into();
        assert!(matches!(protocol_err, ProtocolError::PayloadEncoding(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProtocolError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<()> {
            Ok(())
        }
        assert!(returns_result().is_ok());
    }
}
