//! The client session actor.
//!
//! A [`ClientSession`] owns the [`GestureEngine`] and runs on one tokio
//! task. Touch callbacks, keyboard and media buttons arrive over a channel;
//! classifier timers and the throttle's next forward are awaited in the
//! same `select!`, so the engine never sees two inputs at once.

use std::future::pending;

use padlink_gesture::{GestureConfig, GestureEngine, ThrottleConfig, TouchEvent};
use padlink_types::{Dimensions, Intent, MediaCommand};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace};

use crate::error::ClientError;
use crate::sink::IntentSink;

/// Inputs to a running session.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Touch(TouchEvent),
    /// A character or special key from the phone keyboard.
    Key(String),
    Media(MediaCommand),
    Dimensions(Dimensions),
    Shutdown,
}

/// Feeds a running [`ClientSession`].
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::Sender<ClientEvent>,
}

impl ClientHandle {
    pub async fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.tx.send(event).await.map_err(|_| ClientError::Closed)
    }

    pub async fn touch(&self, event: TouchEvent) -> Result<(), ClientError> {
        self.send(ClientEvent::Touch(event)).await
    }

    pub async fn key(&self, key: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientEvent::Key(key.into())).await
    }

    pub async fn media(&self, command: MediaCommand) -> Result<(), ClientError> {
        self.send(ClientEvent::Media(command)).await
    }

    pub async fn dimensions(&self, dimensions: Dimensions) -> Result<(), ClientError> {
        self.send(ClientEvent::Dimensions(dimensions)).await
    }

    /// Ask the session to wind down. Succeeds if it already has.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(ClientEvent::Shutdown).await;
    }
}

pub struct ClientSession<S> {
    engine: GestureEngine,
    sink: S,
    events: mpsc::Receiver<ClientEvent>,
    started: Instant,
    sent: u64,
}

impl<S: IntentSink> ClientSession<S> {
    pub fn new(gesture: &GestureConfig, throttle: &ThrottleConfig, sink: S) -> (Self, ClientHandle) {
        let (tx, events) = mpsc::channel(256);
        let session = Self {
            engine: GestureEngine::new(gesture, throttle),
            sink,
            events,
            started: Instant::now(),
            sent: 0,
        };
        (session, ClientHandle { tx })
    }

    /// Run until [`ClientEvent::Shutdown`], every handle is dropped, or the
    /// sink fails. On a clean stop, held-back motion is flushed and an open
    /// drag or scroll is closed before the sink is closed. Returns the sink.
    pub async fn run(mut self) -> Result<S, ClientError> {
        info!("client session started");
        loop {
            let deadline = self.engine.next_deadline().map(|d| self.started + d);
            tokio::select! {
                event = self.events.recv() => {
                    let intents = match event {
                        Some(ClientEvent::Touch(touch)) => {
                            trace!(phase = ?touch.phase, contacts = touch.contacts.len(), "touch");
                            self.engine.handle(self.elapsed(), &touch)
                        }
                        Some(ClientEvent::Key(key)) => {
                            self.engine.submit(self.elapsed(), Intent::Keyboard { key })
                        }
                        Some(ClientEvent::Media(command)) => {
                            self.engine.submit(self.elapsed(), Intent::Media(command))
                        }
                        Some(ClientEvent::Dimensions(dims)) => {
                            self.engine.submit(self.elapsed(), Intent::Dimensions(dims))
                        }
                        Some(ClientEvent::Shutdown) | None => break,
                    };
                    self.forward(intents).await?;
                }
                () = wait_for(deadline) => {
                    let intents = self.engine.poll_timers(self.elapsed());
                    self.forward(intents).await?;
                }
            }
        }

        let intents = self.engine.finish(self.elapsed());
        self.forward(intents).await?;
        self.sink.close().await?;
        info!(sent = self.sent, "client session finished");
        Ok(self.sink)
    }

    fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    async fn forward(&mut self, intents: Vec<Intent>) -> Result<(), ClientError> {
        for intent in intents {
            debug!(intent = intent.name(), "send");
            self.sink.send(intent).await?;
            self.sent += 1;
        }
        Ok(())
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}
