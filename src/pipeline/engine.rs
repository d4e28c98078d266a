//! Pipeline coordinator: one inbound message in, at most one reply out.
//!
//! Per-message flow: staleness filter -> dedup -> media capture ->
//! admin branch | classifier | cache | completion fallback -> reply ->
//! audit append. Every failure is contained in the stage that produced it;
//! nothing here may take down a concurrently processing message.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, mpsc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::pipeline::admin::{self, AdminCommand};
use crate::pipeline::cache::ResponseCache;
use crate::pipeline::completion::CompletionProvider;
use crate::pipeline::media::MediaRetriever;
use crate::pipeline::message::{self, InboundMessage, MessageRecord, STATUS_BROADCAST};
use crate::pipeline::responses;
use crate::pipeline::rules::RuleSet;
use crate::pipeline::store::MessageStore;
use crate::pipeline::transport::{SendOptions, Transport};

/// Messages older than this are dropped as late-delivered backlog noise.
const STALENESS_WINDOW_SECS: i64 = 60;

pub struct PipelineEngine<T, C> {
    admin_jid: String,
    transport: Arc<T>,
    completion: Arc<C>,
    store: Arc<MessageStore>,
    cache: Mutex<ResponseCache>,
    rules: RuleSet,
    media: MediaRetriever,
    shutdown: Arc<Notify>,
}

impl<T, C> PipelineEngine<T, C>
where
    T: Transport,
    C: CompletionProvider,
{
    pub fn new(
        config: &Config,
        transport: Arc<T>,
        completion: Arc<C>,
        store: Arc<MessageStore>,
    ) -> Self {
        Self {
            admin_jid: config.admin_jid.clone(),
            transport,
            completion,
            store,
            cache: Mutex::new(ResponseCache::new(config.cache_capacity, config.cache_ttl)),
            rules: RuleSet::new(),
            media: MediaRetriever::new(
                config.download_retries,
                config.download_initial_delay,
                config.max_media_size,
                config.allowed_media_types.clone(),
                config.media_dir.clone(),
            ),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Notified once when `!exit` is accepted.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run one message through the pipeline.
    pub async fn handle_message(&self, msg: InboundMessage) {
        if msg.from == STATUS_BROADCAST {
            return;
        }

        let now = chrono::Utc::now().timestamp();
        if msg.timestamp_seconds < now - STALENESS_WINDOW_SECS {
            info!("Ignored old message: {}", msg.id);
            return;
        }

        // Commands issued from the bot's own account belong to the admin.
        // Re-attribution happens before the dedup lookup; replies keep going
        // to the originating chat.
        let origin = msg.from.clone();
        let sender = if msg.is_from_self {
            self.admin_jid.clone()
        } else {
            msg.from.clone()
        };

        if self.store.seen(&msg.id) {
            info!("Ignored duplicate message: {}", msg.id);
            return;
        }

        let body = message::sanitize(&msg.body);
        let normalized = message::normalize(&body);

        // Media capture. Terminal media errors abort media handling only;
        // classification continues on the text body alone.
        let mut media_path = None;
        let mut media_type = None;
        if msg.has_media || msg.is_single_view {
            match self.media.fetch(self.transport.as_ref(), &msg).await {
                Ok(artifact) => {
                    if msg.is_single_view {
                        self.media
                            .forward_single_view(
                                self.transport.as_ref(),
                                &self.admin_jid,
                                &msg,
                                &artifact,
                            )
                            .await;
                    }
                    media_path = Some(artifact.path.to_string_lossy().into_owned());
                    media_type = Some(artifact.mime_type.clone());
                }
                Err(e) => warn!("Media error for message {}: {e}", msg.id),
            }
        }

        // Audit append is decoupled from the reply path: fire-and-forget,
        // failures logged, never rolled back.
        let record = MessageRecord {
            id: msg.id.clone(),
            from_jid: sender.clone(),
            body: body.clone(),
            timestamp: msg.timestamp_seconds,
            media_path,
            media_type,
            is_view_once: msg.is_single_view,
            processed: true,
        };
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.append(&record) {
                warn!("{e}");
            }
        });

        // Admin commands have side effects, so they run before
        // classification and never fall through to it.
        if normalized.starts_with('!') {
            self.handle_admin(&origin, &sender, &normalized, &msg.mentions).await;
            return;
        }

        if let Some(reply) = self.resolve_reply(&normalized, &body).await {
            self.send(&origin, &reply).await;
        }
        debug!("Processed message {} from {}", msg.id, sender);
    }

    /// Classifier, then cache, then completion fallback. At most one reply.
    async fn resolve_reply(&self, normalized: &str, body: &str) -> Option<String> {
        if normalized.is_empty() {
            return None;
        }

        if let Some(reply) = self.rules.classify(normalized) {
            return Some(reply.to_string());
        }

        if let Some(cached) = self.cache.lock().unwrap().get(normalized) {
            info!("Served cached response");
            return Some(cached);
        }

        match self.completion.complete(body).await {
            // Empty means the provider has nothing in-scope to say.
            Ok(reply) if reply.is_empty() => None,
            Ok(reply) => {
                self.cache.lock().unwrap().put(normalized, &reply);
                Some(reply)
            }
            Err(e) => {
                warn!("Completion fallback failed: {e}");
                None
            }
        }
    }

    async fn handle_admin(&self, origin: &str, sender: &str, normalized: &str, mentions: &[String]) {
        if sender != self.admin_jid {
            self.send(origin, admin::REFUSAL).await;
            return;
        }

        match AdminCommand::parse(normalized) {
            Some(AdminCommand::Status) => self.send(origin, admin::STATUS).await,
            Some(AdminCommand::Info) => self.send(origin, &admin::info_text()).await,
            Some(AdminCommand::Stats) => {
                let text =
                    admin::stats_text(self.store.message_count(), self.store.sender_count());
                self.send(origin, &text).await;
            }
            Some(AdminCommand::Exit) => {
                self.send(origin, admin::SHUTDOWN_ACK).await;
                self.shutdown.notify_one();
            }
            Some(AdminCommand::Remove) => self.handle_remove(origin, sender, mentions).await,
            None => self.send(origin, responses::ADMIN_HELP).await,
        }
    }

    async fn handle_remove(&self, origin: &str, sender: &str, mentions: &[String]) {
        if !message::is_group_jid(origin) {
            self.send(origin, admin::GROUP_ONLY).await;
            return;
        }

        let is_admin = match self.transport.is_group_admin(origin, sender).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Group admin check failed in {origin}: {e}");
                false
            }
        };
        if !is_admin {
            self.send(origin, admin::NOT_GROUP_ADMIN).await;
            return;
        }

        if mentions.is_empty() {
            self.send(origin, admin::TAG_SOMEONE).await;
            return;
        }

        let mut removed = Vec::new();
        let mut failed = Vec::new();
        for jid in mentions {
            match self.transport.remove_participant(origin, jid).await {
                Ok(()) => removed.push(jid.clone()),
                Err(e) => {
                    warn!("Remove failed for {jid}: {e}");
                    failed.push(jid.clone());
                }
            }
        }
        self.send(origin, &admin::removal_report(&removed, &failed)).await;
    }

    async fn send(&self, target: &str, content: &str) {
        if let Err(e) = self.transport.send(target, content, SendOptions::default()).await {
            warn!("Failed to send to {target}: {e}");
        }
    }
}

/// Fans inbound events out to pipeline workers. A conversation always lands
/// on the same worker, so replies within a conversation follow arrival
/// order while distinct conversations proceed concurrently.
pub struct Dispatcher {
    tx: mpsc::Sender<InboundMessage>,
}

impl Dispatcher {
    pub fn start<T, C>(
        engine: Arc<PipelineEngine<T, C>>,
        workers: usize,
        queue_depth: usize,
    ) -> Self
    where
        T: Transport + 'static,
        C: CompletionProvider + 'static,
    {
        let workers = workers.max(1);
        let (tx, mut rx) = mpsc::channel::<InboundMessage>(queue_depth);

        let worker_txs: Vec<mpsc::Sender<InboundMessage>> = (0..workers)
            .map(|_| {
                let (wtx, mut wrx) = mpsc::channel::<InboundMessage>(queue_depth);
                let engine = engine.clone();
                tokio::spawn(async move {
                    while let Some(msg) = wrx.recv().await {
                        engine.handle_message(msg).await;
                    }
                });
                wtx
            })
            .collect();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let idx = conversation_worker(&msg.from, worker_txs.len());
                if worker_txs[idx].send(msg).await.is_err() {
                    warn!("Pipeline worker {idx} is gone, stopping dispatch");
                    break;
                }
            }
        });

        Self { tx }
    }

    /// Ingress handle for the transport reader.
    pub fn sender(&self) -> mpsc::Sender<InboundMessage> {
        self.tx.clone()
    }
}

fn conversation_worker(jid: &str, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    jid.hash(&mut hasher);
    (hasher.finish() as usize) % workers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_worker_is_stable() {
        let a = conversation_worker("233201234567@c.us", 4);
        for _ in 0..10 {
            assert_eq!(conversation_worker("233201234567@c.us", 4), a);
        }
        assert!(a < 4);
    }

    #[test]
    fn test_conversation_worker_single_worker() {
        assert_eq!(conversation_worker("anything@c.us", 1), 0);
    }
}
