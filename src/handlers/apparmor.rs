use crate::registry::{default_render, Entry};
use crate::render::{Block, Renderer, Urgency};
use crate::types::{Record, Value};

pub const ENTRY: Entry = Entry {
    significant_fields,
    render,
};

fn is_denied(record: &Record) -> bool {
    record.get("apparmor").and_then(Value::as_str) == Some("DENIED")
}

/// For denials, drop what identifies the process and, for file system
/// access, the file owner. Other outcomes are kept whole.
pub fn significant_fields(record: &Record) -> Record {
    if is_denied(record) {
        record.without(&["time", "pid", "comm", "fsuid", "ouid"])
    } else {
        record.clone()
    }
}

pub fn render(record: &Record, renderer: &Renderer, suffix: &str) -> String {
    if !is_denied(record) {
        log::warn!(
            "Unknown AppArmor message type {}, printing as is",
            record
                .get("apparmor")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "(none)".into())
        );
        return default_render(record, renderer, suffix);
    }
    let block = Block::new("AppArmor policy violation", Urgency::Warn)
        .time(record.time())
        .info("Operation", record.get("operation"))
        .info("Profile", record.get("profile"))
        .info("Target", record.get("name").or_else(|| record.get("peer")))
        .info("Denied mask", record.get("denied_mask"))
        .extra("Requested mask", record.get("requested_mask"))
        .extra("Process ID", record.get("pid"))
        .extra("FS UID", record.get("fsuid"))
        .extra("OUID", record.get("ouid"));
    renderer.render(&block, suffix)
}
