//! Transport contract consumed by the engine, plus the WebSocket adapter.
//!
//! The engine only ever sees a [`Channel`]: an in-order, deliver-once stream
//! of inbound text messages and a fire-and-forget outbound queue. The
//! [`GatewayTransport`] adapter produces one from a WebSocket connection by
//! splitting the socket into a writer task and a reader task, with an
//! idempotent cancellation token tying their lifetimes together.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use protocol::error::{ProtocolError, Result};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Queue depth for each direction of a channel.
const CHANNEL_BUFFER: usize = 256;

/// One attempt's duplex text-message channel.
///
/// Inbound messages arrive in order, each delivered once. `close` is
/// idempotent and releases the underlying connection; sends after close
/// fail with `ConnectionClosed`. Dropping the channel also closes it.
#[derive(Debug)]
pub struct Channel {
    outgoing: mpsc::Sender<String>,
    incoming: mpsc::Receiver<Result<String>>,
    closer: CancellationToken,
}

impl Channel {
    /// Builds a channel from its transport-side endpoints.
    pub fn new(
        outgoing: mpsc::Sender<String>,
        incoming: mpsc::Receiver<Result<String>>,
        closer: CancellationToken,
    ) -> Self {
        Self {
            outgoing,
            incoming,
            closer,
        }
    }

    /// Queues a text message for sending.
    pub async fn send(&self, text: String) -> Result<()> {
        self.outgoing
            .send(text)
            .await
            .map_err(|_| ProtocolError::ConnectionClosed("send on closed channel".to_string()))
    }

    /// Receives the next inbound message; `None` once the stream ends.
    pub async fn recv(&mut self) -> Option<Result<String>> {
        self.incoming.recv().await
    }

    /// Releases the underlying connection. Safe to call more than once.
    pub fn close(&self) {
        self.closer.cancel();
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.closer.is_cancelled()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.closer.cancel();
    }
}

/// Abstract connector for the gateway.
///
/// Each attempt gets its own channel instance; there is no pooling or reuse.
pub trait Transport: Send + Sync {
    /// Opens a duplex text-message channel to `endpoint`, presenting
    /// `origin` in the upgrade request.
    fn connect(
        &self,
        endpoint: &str,
        origin: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Channel>> + Send + '_>>;
}

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayTransport;

impl Transport for GatewayTransport {
    fn connect(
        &self,
        endpoint: &str,
        origin: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Channel>> + Send + '_>> {
        let endpoint = endpoint.to_string();
        let origin = origin.to_string();

        Box::pin(async move {
            Url::parse(&endpoint)
                .map_err(|e| ProtocolError::HandshakeFailed(format!("invalid gateway URL: {}", e)))?;

            let mut request = endpoint.as_str().into_client_request().map_err(|e| {
                ProtocolError::HandshakeFailed(format!("invalid gateway request: {}", e))
            })?;
            request.headers_mut().insert(
                ORIGIN,
                HeaderValue::from_str(&origin).map_err(|e| {
                    ProtocolError::HandshakeFailed(format!("invalid origin header: {}", e))
                })?,
            );

            tracing::info!(endpoint = %endpoint, "connecting to gateway");
            let (ws_stream, _) = connect_async(request).await.map_err(|e| match e {
                WsError::Io(io_err) => ProtocolError::ConnectionClosed(io_err.to_string()),
                _ => ProtocolError::HandshakeFailed(format!("WebSocket connection failed: {}", e)),
            })?;

            let (mut ws_sink, mut ws_stream) = ws_stream.split();

            let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(CHANNEL_BUFFER);
            let (incoming_tx, incoming_rx) = mpsc::channel::<Result<String>>(CHANNEL_BUFFER);
            let closer = CancellationToken::new();

            // Writer: drains the outbound queue until the channel is closed,
            // then sends a Close frame.
            let writer_closer = closer.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = writer_closer.cancelled() => {
                            let _ = ws_sink.send(WsMessage::Close(None)).await;
                            break;
                        }
                        queued = outgoing_rx.recv() => {
                            let Some(text) = queued else {
                                let _ = ws_sink.send(WsMessage::Close(None)).await;
                                break;
                            };
                            if let Err(e) = ws_sink.send(WsMessage::Text(text)).await {
                                tracing::error!("failed to send WebSocket message: {}", e);
                                break;
                            }
                        }
                    }
                }
            });

            // Reader: forwards text frames in arrival order; close frames and
            // socket errors are surfaced as ConnectionClosed.
            let reader_closer = closer.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = reader_closer.cancelled() => break,
                        frame = ws_stream.next() => {
                            match frame {
                                Some(Ok(WsMessage::Text(text))) => {
                                    if incoming_tx.send(Ok(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(Ok(WsMessage::Close(_))) | None => {
                                    let _ = incoming_tx
                                        .send(Err(ProtocolError::ConnectionClosed(
                                            "gateway closed the connection".to_string(),
                                        )))
                                        .await;
                                    break;
                                }
                                Some(Ok(_)) => {
                                    // Ping/pong/binary frames carry no opcodes.
                                }
                                Some(Err(e)) => {
                                    let _ = incoming_tx
                                        .send(Err(ProtocolError::ConnectionClosed(format!(
                                            "WebSocket error: {}",
                                            e
                                        ))))
                                        .await;
                                    break;
                                }
                            }
                        }
                    }
                }
            });

            Ok(Channel::new(outgoing_tx, incoming_rx, closer))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_channel() -> (
        Channel,
        mpsc::Receiver<String>,
        mpsc::Sender<Result<String>>,
        CancellationToken,
    ) {
        let (out_tx, out_rx) = mpsc::channel(8);
        let (in_tx, in_rx) = mpsc::channel(8);
        let closer = CancellationToken::new();
        let channel = Channel::new(out_tx, in_rx, closer.clone());
        (channel, out_rx, in_tx, closer)
    }

    #[tokio::test]
    async fn test_channel_send_and_recv() {
        let (mut channel, mut out_rx, in_tx, _closer) = test_channel();

        channel.send("outbound".to_string()).await.unwrap();
        assert_eq!(out_rx.recv().await.unwrap(), "outbound");

        in_tx.send(Ok("inbound".to_string())).await.unwrap();
        assert_eq!(channel.recv().await.unwrap().unwrap(), "inbound");
    }

    #[tokio::test]
    async fn test_channel_recv_preserves_order() {
        let (mut channel, _out_rx, in_tx, _closer) = test_channel();

        in_tx.send(Ok("first".to_string())).await.unwrap();
        in_tx.send(Ok("second".to_string())).await.unwrap();

        assert_eq!(channel.recv().await.unwrap().unwrap(), "first");
        assert_eq!(channel.recv().await.unwrap().unwrap(), "second");
    }

    #[tokio::test]
    async fn test_channel_close_is_idempotent() {
        let (channel, _out_rx, _in_tx, closer) = test_channel();

        assert!(!channel.is_closed());
        channel.close();
        channel.close();
        assert!(channel.is_closed());
        assert!(closer.is_cancelled());
    }

    #[tokio::test]
    async fn test_channel_drop_closes() {
        let (channel, _out_rx, _in_tx, closer) = test_channel();
        drop(channel);
        assert!(closer.is_cancelled());
    }

    #[tokio::test]
    async fn test_channel_send_fails_without_receiver() {
        let (channel, out_rx, _in_tx, _closer) = test_channel();
        drop(out_rx);

        let err = channel.send("lost".to_string()).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_gateway_connect_rejects_invalid_url() {
        let err = GatewayTransport
            .connect("not a url", "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::HandshakeFailed(_)));
    }

    #[tokio::test]
    async fn test_gateway_connect_failure_is_reported() {
        // Nothing listens on port 1; the connect must fail, not retry.
        let result = GatewayTransport
            .connect("ws://127.0.0.1:1", "https://example.com")
            .await;
        assert!(result.is_err());
    }
}
