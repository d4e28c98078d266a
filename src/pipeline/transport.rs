//! Transport seam: the operations the pipeline needs from the chat layer.
//!
//! The session/connection lifecycle lives outside this process; the pipeline
//! only sends replies, pulls media payloads and performs the group actions
//! behind `!remove`.

use std::future::Future;
use std::path::Path;

/// Options for an outbound send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub caption: Option<String>,
    pub send_as_document: bool,
}

/// Raw media as delivered by the transport. whatsapp-web.js hands media over
/// base64-encoded, so the payload stays encoded until validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPayload {
    pub data: String,
    pub mimetype: String,
}

pub trait Transport: Send + Sync {
    /// Send a text reply. Delivery/retry of the outbound send is the
    /// transport's responsibility, not ours.
    fn send(
        &self,
        target: &str,
        content: &str,
        options: SendOptions,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Download the media attached to a message.
    fn download_media(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<MediaPayload, String>> + Send;

    /// Send a file from disk as a document.
    fn send_document(
        &self,
        target: &str,
        path: &Path,
        caption: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Does `jid` hold admin capability in `group`?
    fn is_group_admin(
        &self,
        group: &str,
        jid: &str,
    ) -> impl Future<Output = Result<bool, String>> + Send;

    /// Remove a participant from a group.
    fn remove_participant(
        &self,
        group: &str,
        jid: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;
}
