//! Admin command grammar (`!` prefix) and reply texts.
//!
//! Parsing lives here; execution is in the coordinator since the commands
//! have side effects against the store and the transport.

pub const REFUSAL: &str = "❌ Admin commands are restricted to the bot owner.";
pub const STATUS: &str = "Bot is active and running.";
pub const SHUTDOWN_ACK: &str = "Shutting down...";
pub const GROUP_ONLY: &str = "❌ Group command only.";
pub const NOT_GROUP_ADMIN: &str = "❌ Only group admins can remove members.";
pub const TAG_SOMEONE: &str = "Tag someone to remove.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Status,
    Info,
    Stats,
    Exit,
    Remove,
}

impl AdminCommand {
    /// Parse a normalized (trimmed, lowercased) body starting with `!`.
    pub fn parse(normalized: &str) -> Option<Self> {
        let rest = normalized.strip_prefix('!')?;
        match rest.split_whitespace().next()? {
            "status" => Some(Self::Status),
            "info" => Some(Self::Info),
            "stats" => Some(Self::Stats),
            "exit" => Some(Self::Exit),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

pub fn info_text() -> String {
    format!(
        "Bot Info:\n- Version: {}\n- Services: Automation for Businesses",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn stats_text(messages: usize, users: usize) -> String {
    format!("📊 Bot Stats:\n- Messages: {messages}\n- Users: {users}")
}

/// Per-participant removal report so partial success stays visible.
pub fn removal_report(removed: &[String], failed: &[String]) -> String {
    let mut report = String::new();
    if !removed.is_empty() {
        report.push_str(&format!("✅ Removed: {}", removed.join(", ")));
    }
    if !failed.is_empty() {
        if !report.is_empty() {
            report.push('\n');
        }
        report.push_str(&format!("⚠️ Failed to remove: {}", failed.join(", ")));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(AdminCommand::parse("!status"), Some(AdminCommand::Status));
        assert_eq!(AdminCommand::parse("!info"), Some(AdminCommand::Info));
        assert_eq!(AdminCommand::parse("!stats"), Some(AdminCommand::Stats));
        assert_eq!(AdminCommand::parse("!exit"), Some(AdminCommand::Exit));
        assert_eq!(AdminCommand::parse("!remove"), Some(AdminCommand::Remove));
    }

    #[test]
    fn test_parse_remove_with_mentions() {
        assert_eq!(AdminCommand::parse("!remove @user"), Some(AdminCommand::Remove));
    }

    #[test]
    fn test_parse_rejects_unknown_and_unprefixed() {
        assert_eq!(AdminCommand::parse("!selfdestruct"), None);
        assert_eq!(AdminCommand::parse("status"), None);
        assert_eq!(AdminCommand::parse("!"), None);
    }

    #[test]
    fn test_removal_report_partial_success() {
        let removed = vec!["a@c.us".to_string()];
        let failed = vec!["b@c.us".to_string()];
        let report = removal_report(&removed, &failed);
        assert!(report.contains("✅ Removed: a@c.us"));
        assert!(report.contains("⚠️ Failed to remove: b@c.us"));
    }

    #[test]
    fn test_removal_report_all_failed() {
        let report = removal_report(&[], &["b@c.us".to_string()]);
        assert!(!report.contains("Removed:"));
        assert!(report.contains("⚠️ Failed to remove: b@c.us"));
    }
}
