//! Where classified intents go.

use std::time::Duration;

use async_trait::async_trait;
use padlink_protocol::handshake::initiate;
use padlink_protocol::{
    ClientHello, MessageReceiver, MessageSender, PeerConnection, QuicTransport, ServerWelcome,
};
use padlink_types::{ClientId, Intent, Message};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// How long [`QuicSink::close`] waits for the receiver to hang up.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Accepts intents in the order the session produces them.
#[async_trait]
pub trait IntentSink: Send + 'static {
    async fn send(&mut self, intent: Intent) -> Result<(), ClientError>;

    /// Flush and release the underlying channel.
    async fn close(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

/// Sends intents to a receiver over QUIC.
pub struct QuicSink {
    transport: QuicTransport,
    conn: PeerConnection,
    sender: Option<MessageSender>,
    // Held so the stream stays open for the receiver's replies.
    _receiver: MessageReceiver,
    welcome: ServerWelcome,
}

impl QuicSink {
    /// Connect and handshake using the `[server]` and `[viewport]` settings.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.server.socket_addr()?;
        let transport = QuicTransport::client(config.server.fingerprint.as_deref())?;
        let conn = transport.connect(addr, &config.server.server_name).await?;
        let session = initiate(
            &conn,
            ClientHello {
                client_id: ClientId::new(),
                name: config.server.name.clone(),
                viewport: config.viewport.dimensions(),
            },
        )
        .await?;
        info!(
            receiver = %session.peer.name,
            width = session.peer.screen.width,
            height = session.peer.screen.height,
            %addr,
            "connected"
        );
        Ok(Self {
            transport,
            conn,
            sender: Some(session.sender),
            _receiver: session.receiver,
            welcome: session.peer,
        })
    }

    /// What the receiver said about itself.
    pub fn welcome(&self) -> &ServerWelcome {
        &self.welcome
    }
}

#[async_trait]
impl IntentSink for QuicSink {
    async fn send(&mut self, intent: Intent) -> Result<(), ClientError> {
        let sender = self.sender.as_mut().ok_or(ClientError::Closed)?;
        sender.send(&Message::Intent(intent)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        let Some(mut sender) = self.sender.take() else {
            return Ok(());
        };
        sender.send(&Message::Bye).await?;
        sender.finish()?;
        // The receiver closes the connection once it has read `Bye`.
        if tokio::time::timeout(CLOSE_GRACE, self.conn.closed()).await.is_err() {
            debug!("receiver did not hang up, closing");
        }
        self.conn.close("bye");
        self.transport.close();
        Ok(())
    }
}

/// Delivers intents to an in-process channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Intent>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Intent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl IntentSink for ChannelSink {
    async fn send(&mut self, intent: Intent) -> Result<(), ClientError> {
        self.tx.send(intent).map_err(|_| ClientError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padlink_types::ClickButton;

    #[tokio::test]
    async fn channel_sink_forwards_in_order() {
        let (mut sink, mut rx) = ChannelSink::channel();
        sink.send(Intent::DragStart).await.unwrap();
        sink.send(Intent::Click(ClickButton::Left)).await.unwrap();
        sink.close().await.unwrap();
        assert_eq!(rx.recv().await, Some(Intent::DragStart));
        assert_eq!(rx.recv().await, Some(Intent::Click(ClickButton::Left)));
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_receiver() {
        let (mut sink, rx) = ChannelSink::channel();
        drop(rx);
        assert!(matches!(
            sink.send(Intent::ScrollEnd).await,
            Err(ClientError::Closed)
        ));
    }
}
