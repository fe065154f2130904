use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Text-frame view of a client socket
#[async_trait]
pub trait ClientSocket: Send {
    async fn send_text(&mut self, text: String) -> Result<(), SocketError>;

    /// Next text frame, or None once the client has gone
    async fn next_text(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, participant_id: &str, room_id: &str, message: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

#[async_trait]
impl ClientSocket for WebSocket {
    async fn send_text(&mut self, text: String) -> Result<(), SocketError> {
        self.send(Message::Text(text))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Binary, ping and pong frames carry nothing for us
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// One participant's socket, pumped in both directions until either side ends
pub struct Connection {
    pub participant_id: String,
    pub room_id: String,
    socket: Box<dyn ClientSocket>,
    outbound: mpsc::UnboundedReceiver<String>,
    handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        participant_id: String,
        room_id: String,
        socket: Box<dyn ClientSocket>,
        outbound: mpsc::UnboundedReceiver<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            participant_id,
            room_id,
            socket,
            outbound,
            handler,
        }
    }

    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                outgoing = self.outbound.recv() => match outgoing {
                    Some(text) => self.socket.send_text(text).await?,
                    None => {
                        debug!(participant_id = %self.participant_id, "Outbound channel closed");
                        break;
                    }
                },

                incoming = self.socket.next_text() => match incoming? {
                    Some(text) => {
                        self.handler
                            .handle_message(&self.participant_id, &self.room_id, text)
                            .await;
                    }
                    None => {
                        debug!(participant_id = %self.participant_id, "Client closed socket");
                        break;
                    }
                },
            }
        }

        let _ = self.socket.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    struct ScriptedSocket {
        inbound: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
        hang_up: bool,
    }

    #[async_trait]
    impl ClientSocket for ScriptedSocket {
        async fn send_text(&mut self, text: String) -> Result<(), SocketError> {
            self.sent.lock().await.push(text);
            Ok(())
        }

        async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
            match self.inbound.pop_front() {
                Some(message) => Ok(Some(message)),
                None if self.hang_up => Ok(None),
                // Stay open until the outbound side closes
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        received: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle_message(&self, participant_id: &str, room_id: &str, message: String) {
            self.received.lock().await.push((
                participant_id.to_string(),
                room_id.to_string(),
                message,
            ));
        }
    }

    #[tokio::test]
    async fn test_connection_routes_both_directions() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let socket = ScriptedSocket {
            inbound: VecDeque::from(vec![r#"{"type":"ready"}"#.to_string()]),
            sent: sent.clone(),
            hang_up: false,
        };
        let handler = Arc::new(RecordingHandler::default());
        let (outbound, outbound_receiver) = mpsc::unbounded_channel();

        let connection = Connection::new(
            "p1".to_string(),
            "room".to_string(),
            Box::new(socket),
            outbound_receiver,
            handler.clone(),
        );
        let task = tokio::spawn(connection.run());

        outbound.send("hello".to_string()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        drop(outbound);
        task.await.unwrap().unwrap();

        assert_eq!(*sent.lock().await, vec!["hello".to_string()]);
        let received = handler.received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "p1");
        assert_eq!(received[0].1, "room");
    }

    #[tokio::test]
    async fn test_client_hang_up_ends_connection() {
        let socket = ScriptedSocket {
            inbound: VecDeque::from(vec!["a".to_string(), "b".to_string()]),
            sent: Arc::new(Mutex::new(Vec::new())),
            hang_up: true,
        };
        let handler = Arc::new(RecordingHandler::default());
        let (_outbound, outbound_receiver) = mpsc::unbounded_channel();

        Connection::new(
            "p1".to_string(),
            "room".to_string(),
            Box::new(socket),
            outbound_receiver,
            handler.clone(),
        )
        .run()
        .await
        .unwrap();

        let received = handler.received.lock().await;
        let messages: Vec<&str> = received.iter().map(|(_, _, m)| m.as_str()).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }
}
