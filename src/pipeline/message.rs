//! Inbound message types, body sanitization and JID helpers.

use std::path::PathBuf;

use serde::Deserialize;

/// JID that WhatsApp uses for status broadcasts. Never processed.
pub const STATUS_BROADCAST: &str = "status@broadcast";

/// A message event as delivered by the transport bridge.
///
/// Field names follow the wire shape emitted by the Node side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Serialized message id, globally unique per transport. Sole dedup key.
    pub id: String,
    /// Sender JID (`…@c.us`) or group JID (`…@g.us`).
    pub from: String,
    #[serde(default)]
    pub body: String,
    /// Transport-assigned arrival time, seconds since epoch.
    pub timestamp_seconds: i64,
    #[serde(default)]
    pub has_media: bool,
    #[serde(default)]
    pub is_single_view: bool,
    #[serde(default)]
    pub is_from_self: bool,
    /// JIDs tagged in the message body (used by `!remove`).
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// Media that was downloaded, validated and written to disk.
#[derive(Debug)]
pub struct MediaArtifact {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub path: PathBuf,
}

/// The persisted shape of an accepted message. Append-only.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: String,
    pub from_jid: String,
    pub body: String,
    pub timestamp: i64,
    pub media_path: Option<String>,
    pub media_type: Option<String>,
    pub is_view_once: bool,
    pub processed: bool,
}

pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with("@g.us")
}

/// Strip markup tags and control characters from a message body.
///
/// Runs before any matching or storage so that `<b>help</b>` classifies the
/// same as `help` and stray control bytes never reach the database. A `<`
/// only opens a tag when followed by a letter or `/`; comparisons like
/// `a < b` pass through untouched, as does an unterminated tag.
pub fn sanitize(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '<'
            && chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '/')
        {
            if let Some(end) = chars[i..].iter().position(|&c| c == '>') {
                i += end + 1;
                continue;
            }
        }
        if !c.is_control() || c == '\n' {
            result.push(c);
        }
        i += 1;
    }
    result.trim().to_string()
}

/// Normalized form used as the classifier input and the cache key.
pub fn normalize(body: &str) -> String {
    body.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(sanitize("<b>help</b>"), "help");
        assert_eq!(sanitize("a <script>alert(1)</script> b"), "a alert(1) b");
        assert_eq!(sanitize("plain text"), "plain text");
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        assert_eq!(sanitize("he\u{0}llo\u{7}"), "hello");
        // Newlines survive
        assert_eq!(sanitize("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn test_sanitize_trims() {
        assert_eq!(sanitize("  help  "), "help");
    }

    #[test]
    fn test_sanitize_keeps_bare_less_than() {
        assert_eq!(
            sanitize("can you build a site for < 500 ghs"),
            "can you build a site for < 500 ghs"
        );
        assert_eq!(sanitize("a < b > c"), "a < b > c");
        assert_eq!(sanitize("i <3 your work"), "i <3 your work");
    }

    #[test]
    fn test_sanitize_keeps_unterminated_tag_text() {
        assert_eq!(sanitize("<b unterminated"), "<b unterminated");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  How Much Does Hosting Cost?  "), "how much does hosting cost?");
    }

    #[test]
    fn test_group_jid() {
        assert!(is_group_jid("123456-987@g.us"));
        assert!(!is_group_jid("233201234567@c.us"));
    }

    #[test]
    fn test_wire_shape_deserializes() {
        let json = r#"{
            "id": "true_233201234567@c.us_3EB0",
            "from": "233201234567@c.us",
            "body": "hello",
            "timestampSeconds": 1747527000,
            "hasMedia": false,
            "isSingleView": false,
            "isFromSelf": false,
            "mentions": []
        }"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "true_233201234567@c.us_3EB0");
        assert_eq!(msg.timestamp_seconds, 1747527000);
        assert!(!is_group_jid(&msg.from));
    }

    #[test]
    fn test_wire_shape_defaults() {
        // Flags and mentions are optional on the wire
        let json = r#"{"id":"m1","from":"a@c.us","timestampSeconds":1}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.body, "");
        assert!(!msg.has_media);
        assert!(msg.mentions.is_empty());
    }
}
