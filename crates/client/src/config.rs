//! Fixed gateway endpoints and client configuration.

/// Remote-auth gateway WebSocket endpoint.
pub const GATEWAY_URL: &str = "wss://remote-auth-gateway.discord.gg/?v=1";

/// Origin header the gateway requires on the upgrade request.
pub const GATEWAY_ORIGIN: &str = "https://discord.com";

/// Base of the login URL embedded in the scannable code.
pub const LOGIN_URL_BASE: &str = "https://discordapp.com/ra";

/// Default capacity of the lifecycle event channel.
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Builds the login URL for a pending-login fingerprint.
pub fn login_url(fingerprint: &str) -> String {
    format!("{}/{}", LOGIN_URL_BASE, fingerprint)
}

/// Configuration for the auth client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the remote-auth gateway.
    pub gateway_url: String,
    /// Origin header presented on the upgrade request.
    pub origin: String,
    /// Capacity of the lifecycle event channel.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: GATEWAY_URL.to_string(),
            origin: GATEWAY_ORIGIN.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration pointed at the given gateway URL.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            ..Default::default()
        }
    }

    /// Sets the origin header value.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }
}
