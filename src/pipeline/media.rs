//! Media retrieval with bounded retry/backoff and size/type validation.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use regex::Regex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::pipeline::message::{InboundMessage, MediaArtifact};
use crate::pipeline::transport::Transport;

/// Failure conditions the transport reports for downloads that are worth
/// retrying. Anything else aborts immediately.
const TRANSIENT_PATTERN: &str = r"(?i)mediaStage|No data found|Media not available";

#[derive(Debug)]
pub enum MediaError {
    /// Payload exceeded the size limit (actual length in bytes).
    TooLarge(usize),
    /// MIME top-level type not in the allowed set.
    Unsupported(String),
    /// Every attempt failed on a transient condition.
    Exhausted,
    /// Non-retryable failure: bad payload, disk error, or a download error
    /// outside the transient vocabulary.
    Fatal(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge(len) => write!(f, "media file too large ({len} bytes)"),
            Self::Unsupported(mime) => write!(f, "unsupported media type '{mime}'"),
            Self::Exhausted => write!(f, "media download failed after retries"),
            Self::Fatal(msg) => write!(f, "media download failed: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {}

/// Explicit backoff state: attempt counter and current delay, doubling after
/// each transient failure.
pub struct Backoff {
    max_attempts: u32,
    attempt: u32,
    delay: Duration,
}

impl Backoff {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt: 1,
            delay: initial_delay,
        }
    }

    /// The attempt about to run, 1-based.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next attempt, or `None` when attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        let delay = self.delay;
        self.delay *= 2;
        Some(delay)
    }
}

/// Downloads, validates and persists message media.
pub struct MediaRetriever {
    retries: u32,
    initial_delay: Duration,
    max_size: usize,
    allowed_types: Vec<String>,
    media_dir: PathBuf,
    transient: Regex,
}

impl MediaRetriever {
    pub fn new(
        retries: u32,
        initial_delay: Duration,
        max_size: usize,
        allowed_types: Vec<String>,
        media_dir: PathBuf,
    ) -> Self {
        Self {
            retries,
            initial_delay,
            max_size,
            allowed_types,
            media_dir,
            transient: Regex::new(TRANSIENT_PATTERN).unwrap(),
        }
    }

    /// Fetch the media attached to `msg`, retrying transient failures with
    /// exponential backoff, then validate size (first) and type (second) and
    /// write the artifact to disk. Validation failures are terminal and never
    /// consume retry attempts.
    pub async fn fetch<T: Transport>(
        &self,
        transport: &T,
        msg: &InboundMessage,
    ) -> Result<MediaArtifact, MediaError> {
        let mut backoff = Backoff::new(self.retries, self.initial_delay);

        let payload = loop {
            match transport.download_media(&msg.id).await {
                Ok(payload) => break payload,
                Err(e) => {
                    warn!("Attempt {} failed for {}: {e}", backoff.attempt(), msg.id);
                    if !self.transient.is_match(&e) {
                        return Err(MediaError::Fatal(e));
                    }
                    match backoff.next_delay() {
                        Some(delay) => sleep(delay).await,
                        None => return Err(MediaError::Exhausted),
                    }
                }
            }
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| MediaError::Fatal(format!("invalid base64 payload: {e}")))?;

        if data.len() > self.max_size {
            return Err(MediaError::TooLarge(data.len()));
        }
        let top_level = payload.mimetype.split('/').next().unwrap_or("");
        if !self
            .allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(top_level))
        {
            return Err(MediaError::Unsupported(payload.mimetype.clone()));
        }

        let dir = self
            .media_dir
            .join(if msg.is_single_view { "view_once" } else { "regular" });
        std::fs::create_dir_all(&dir)
            .map_err(|e| MediaError::Fatal(format!("failed to create media dir: {e}")))?;

        let ext = payload
            .mimetype
            .split('/')
            .nth(1)
            .unwrap_or("bin")
            .split(';')
            .next()
            .unwrap_or("bin");
        let path = dir.join(format!("{}.{ext}", msg.id));
        std::fs::write(&path, &data)
            .map_err(|e| MediaError::Fatal(format!("failed to write media file: {e}")))?;
        info!("Saved media: {:?}", path);

        Ok(MediaArtifact {
            data,
            mime_type: payload.mimetype,
            path,
        })
    }

    /// Forward a single-view artifact to the admin as a document. One shot:
    /// a forwarding failure is logged, never retried or escalated.
    pub async fn forward_single_view<T: Transport>(
        &self,
        transport: &T,
        admin_jid: &str,
        msg: &InboundMessage,
        artifact: &MediaArtifact,
    ) {
        let caption = format!("View Once media from {}", msg.from);
        match transport
            .send_document(admin_jid, &artifact.path, &caption)
            .await
        {
            Ok(()) => info!("Sent view-once media to admin from {}", msg.from),
            Err(e) => warn!("Failed to forward view-once media from {}: {e}", msg.from),
        }
    }
}
