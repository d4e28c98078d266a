//! Durable SQLite message store: dedup by id plus the append-only audit log.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};
use tracing::info;

use crate::pipeline::message::MessageRecord;

/// Append-only store of accepted messages.
///
/// The `id` primary key is the authoritative dedup guard: even if two
/// pipeline runs race past the in-memory `seen` check, only one insert
/// lands and the other is silently ignored.
pub struct MessageStore {
    conn: Mutex<Connection>,
}

impl MessageStore {
    /// In-memory store, used in tests.
    pub fn in_memory() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema();
        store
    }

    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Self {
        let conn = Connection::open(path).expect("Failed to open database");
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema();
        info!(
            "Loaded message store from {:?} ({} messages)",
            path,
            store.message_count()
        );
        store
    }

    fn init_schema(&self) {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                fromJid TEXT,
                body TEXT,
                timestamp INTEGER,
                mediaPath TEXT,
                mediaType TEXT,
                isViewOnce INTEGER DEFAULT 0,
                processed INTEGER DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_messages_from ON messages(fromJid);
            CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
        "#,
        )
        .expect("Failed to initialize database schema");
    }

    /// Has a message with this id already been recorded?
    pub fn seen(&self, id: &str) -> bool {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1 FROM messages WHERE id = ?1", params![id], |_| Ok(()))
            .is_ok()
    }

    /// Append a record. Returns `Ok(false)` when the id was already present;
    /// a duplicate is an expected condition, never an error.
    pub fn append(&self, record: &MessageRecord) -> Result<bool, String> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO messages
                 (id, fromJid, body, timestamp, mediaPath, mediaType, isViewOnce, processed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.from_jid,
                    record.body,
                    record.timestamp,
                    record.media_path,
                    record.media_type,
                    record.is_view_once as i64,
                    record.processed as i64,
                ],
            )
            .map_err(|e| format!("Failed to insert message {}: {e}", record.id))?;
        Ok(inserted > 0)
    }

    /// Total recorded messages (feeds `!stats`).
    pub fn message_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    /// Distinct senders ever recorded (feeds `!stats`).
    pub fn sender_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(DISTINCT fromJid) FROM messages",
            [],
            |row| row.get::<_, i64>(0),
        )
        .unwrap_or(0) as usize
    }

    /// Fetch a record back out, for assertions.
    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<MessageRecord> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, fromJid, body, timestamp, mediaPath, mediaType, isViewOnce, processed
             FROM messages WHERE id = ?1",
            params![id],
            |row| {
                Ok(MessageRecord {
                    id: row.get(0)?,
                    from_jid: row.get(1)?,
                    body: row.get(2)?,
                    timestamp: row.get(3)?,
                    media_path: row.get(4)?,
                    media_type: row.get(5)?,
                    is_view_once: row.get::<_, i64>(6)? != 0,
                    processed: row.get::<_, i64>(7)? != 0,
                })
            },
        )
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, from: &str) -> MessageRecord {
        MessageRecord {
            id: id.to_string(),
            from_jid: from.to_string(),
            body: "hello".to_string(),
            timestamp: 1747527000,
            media_path: None,
            media_type: None,
            is_view_once: false,
            processed: true,
        }
    }

    #[test]
    fn test_append_then_seen() {
        let store = MessageStore::in_memory();
        assert!(!store.seen("m1"));
        assert!(store.append(&make_record("m1", "a@c.us")).unwrap());
        assert!(store.seen("m1"));
    }

    #[test]
    fn test_duplicate_append_is_silent_noop() {
        let store = MessageStore::in_memory();
        assert!(store.append(&make_record("m1", "a@c.us")).unwrap());
        assert!(!store.append(&make_record("m1", "a@c.us")).unwrap());
        assert_eq!(store.message_count(), 1);
    }

    #[test]
    fn test_counts() {
        let store = MessageStore::in_memory();
        store.append(&make_record("m1", "a@c.us")).unwrap();
        store.append(&make_record("m2", "a@c.us")).unwrap();
        store.append(&make_record("m3", "b@c.us")).unwrap();
        assert_eq!(store.message_count(), 3);
        assert_eq!(store.sender_count(), 2);
    }

    #[test]
    fn test_media_fields_round_trip() {
        let store = MessageStore::in_memory();
        let mut record = make_record("m1", "a@c.us");
        record.media_path = Some("media/view_once/m1.jpeg".to_string());
        record.media_type = Some("image/jpeg".to_string());
        record.is_view_once = true;
        store.append(&record).unwrap();

        let fetched = store.get("m1").unwrap();
        assert_eq!(fetched.media_path.as_deref(), Some("media/view_once/m1.jpeg"));
        assert_eq!(fetched.media_type.as_deref(), Some("image/jpeg"));
        assert!(fetched.is_view_once);
        assert!(fetched.processed);
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        {
            let store = MessageStore::open(&path);
            store.append(&make_record("m1", "a@c.us")).unwrap();
        }
        let store = MessageStore::open(&path);
        assert!(store.seen("m1"));
    }
}
