//! JSON-lines bridge to the Node transport shim.
//!
//! The shim owns the WhatsApp session (whatsapp-web.js) and talks to this
//! process over stdio, one JSON object per line. Inbound lines are either
//! message events, which go to the pipeline ingress, or responses to
//! commands we issued, matched back to their waiter by request id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::pipeline::message::InboundMessage;
use crate::pipeline::transport::{MediaPayload, SendOptions, Transport};

/// How long a command may wait for the shim to answer.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(20);

/// Commands written to the shim, one per line.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Command<'a> {
    #[serde(rename_all = "camelCase")]
    Send {
        request_id: u64,
        target: &'a str,
        content: &'a str,
        caption: Option<&'a str>,
        send_as_document: bool,
    },
    #[serde(rename_all = "camelCase")]
    FetchMedia { request_id: u64, message_id: &'a str },
    #[serde(rename_all = "camelCase")]
    SendDocument { request_id: u64, target: &'a str, path: &'a str, caption: &'a str },
    #[serde(rename_all = "camelCase")]
    IsGroupAdmin { request_id: u64, group: &'a str, jid: &'a str },
    #[serde(rename_all = "camelCase")]
    RemoveParticipant { request_id: u64, group: &'a str, jid: &'a str },
}

/// Lines read from the shim.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Event {
    Message(InboundMessage),
    Response(BridgeResponse),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeResponse {
    request_id: u64,
    #[serde(default)]
    error: Option<String>,
    /// Base64 media payload for `fetchMedia`.
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    mimetype: Option<String>,
    /// Boolean answer for `isGroupAdmin`.
    #[serde(default)]
    result: Option<bool>,
}

pub struct Bridge<W> {
    out: tokio::sync::Mutex<W>,
    pending: Mutex<HashMap<u64, oneshot::Sender<BridgeResponse>>>,
    next_id: AtomicU64,
}

impl Bridge<tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> Bridge<W>
where
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(out: W) -> Self {
        Self {
            out: tokio::sync::Mutex::new(out),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Consume lines from the shim until its end of stream.
    pub async fn read_loop<R>(&self, reader: R, ingress: mpsc::Sender<InboundMessage>)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => self.handle_line(&line, &ingress).await,
                Ok(None) => {
                    info!("Bridge input closed");
                    break;
                }
                Err(e) => {
                    warn!("Bridge read error: {e}");
                    break;
                }
            }
        }
    }

    async fn handle_line(&self, line: &str, ingress: &mpsc::Sender<InboundMessage>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(Event::Message(msg)) => {
                if ingress.send(msg).await.is_err() {
                    warn!("Pipeline ingress closed, dropping message");
                }
            }
            Ok(Event::Response(resp)) => {
                let waiter = self.pending.lock().unwrap().remove(&resp.request_id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(resp);
                    }
                    // Late answer to a request that already timed out.
                    None => warn!("Response for unknown request {}", resp.request_id),
                }
            }
            Err(e) => warn!("Malformed bridge line: {e}"),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn write_line(&self, line: &str) -> Result<(), String> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| format!("Bridge write error: {e}"))?;
        out.write_all(b"\n")
            .await
            .map_err(|e| format!("Bridge write error: {e}"))?;
        out.flush().await.map_err(|e| format!("Bridge write error: {e}"))
    }

    async fn roundtrip(&self, id: u64, cmd: &Command<'_>) -> Result<BridgeResponse, String> {
        let line = serde_json::to_string(cmd).map_err(|e| format!("Encode error: {e}"))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);

        if let Err(e) = self.write_line(&line).await {
            // Nothing will ever answer a command that was not written.
            self.pending.lock().unwrap().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(RESPONSE_TIMEOUT, rx).await {
            Ok(Ok(resp)) => match resp.error {
                Some(err) => Err(err),
                None => Ok(resp),
            },
            Ok(Err(_)) => Err("Bridge closed before responding".to_string()),
            Err(_) => {
                self.pending.lock().unwrap().remove(&id);
                Err("Bridge request timed out".to_string())
            }
        }
    }
}

impl<W> Transport for Bridge<W>
where
    W: AsyncWrite + Send + Unpin,
{
    async fn send(&self, target: &str, content: &str, options: SendOptions) -> Result<(), String> {
        let id = self.next_id();
        self.roundtrip(
            id,
            &Command::Send {
                request_id: id,
                target,
                content,
                caption: options.caption.as_deref(),
                send_as_document: options.send_as_document,
            },
        )
        .await?;
        Ok(())
    }

    async fn download_media(&self, message_id: &str) -> Result<MediaPayload, String> {
        let id = self.next_id();
        let resp = self
            .roundtrip(id, &Command::FetchMedia { request_id: id, message_id })
            .await?;
        match (resp.data, resp.mimetype) {
            (Some(data), Some(mimetype)) => Ok(MediaPayload { data, mimetype }),
            // The shim answers without a payload when the media is gone
            // from the phone; the retriever treats this as transient.
            _ => Err("No data found".to_string()),
        }
    }

    async fn send_document(&self, target: &str, path: &Path, caption: &str) -> Result<(), String> {
        let id = self.next_id();
        let path = path.to_string_lossy();
        self.roundtrip(
            id,
            &Command::SendDocument { request_id: id, target, path: &path, caption },
        )
        .await?;
        Ok(())
    }

    async fn is_group_admin(&self, group: &str, jid: &str) -> Result<bool, String> {
        let id = self.next_id();
        let resp = self
            .roundtrip(id, &Command::IsGroupAdmin { request_id: id, group, jid })
            .await?;
        Ok(resp.result.unwrap_or(false))
    }

    async fn remove_participant(&self, group: &str, jid: &str) -> Result<(), String> {
        let id = self.next_id();
        self.roundtrip(id, &Command::RemoveParticipant { request_id: id, group, jid })
            .await?;
        Ok(())
    }
}
