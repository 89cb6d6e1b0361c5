//! Dispatch from message type tags to the functions that know how to
//! group and display records of that type.

use std::collections::HashMap;

use crate::handlers;
use crate::render::{Block, Renderer, Urgency};
use crate::types::Record;

/// Reduce a record to the fields that identify "the same kind of
/// event". The result must contain `type`.
pub type SignificantFieldsFn = fn(&Record) -> Record;

/// Render a record; the suffix is appended to the header line.
pub type RenderFn = fn(&Record, &Renderer, &str) -> String;

/// Behaviors registered for a message type
#[derive(Clone, Copy)]
pub struct Entry {
    pub significant_fields: SignificantFieldsFn,
    pub render: RenderFn,
}

/// Fields that differ between otherwise identical events
const VOLATILE: &[&str] = &["time", "pid", "fsuid", "comm"];

/// Significant fields for unknown message types: everything that is
/// not volatile.
pub fn default_significant_fields(record: &Record) -> Record {
    record.without(VOLATILE)
}

/// Render unknown message types by listing all fields
pub fn default_render(record: &Record, renderer: &Renderer, suffix: &str) -> String {
    let ty = record.message_type().unwrap_or_default();
    let block = record
        .iter()
        .filter(|(k, _)| *k != "type" && *k != "time")
        .fold(
            Block::new(format!("Unknown message type (type={})", ty), Urgency::Warn)
                .time(record.time()),
            |b, (k, v)| b.info(k, Some(v)),
        );
    renderer.render(&block, suffix)
}

pub const DEFAULT: Entry = Entry {
    significant_fields: default_significant_fields,
    render: default_render,
};

/// Message type registry. Lookups never fail: unregistered tags get
/// the [`DEFAULT`] entry.
#[derive(Clone)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    /// A registry without any message types
    pub fn empty() -> Self {
        Registry {
            entries: HashMap::new(),
        }
    }

    /// Register behaviors for a tag, replacing any previous entry
    pub fn register<S: Into<String>>(&mut self, tag: S, entry: Entry) {
        self.entries.insert(tag.into(), entry);
    }

    pub fn lookup(&self, tag: &str) -> &Entry {
        self.entries.get(tag).unwrap_or(&DEFAULT)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags, names before numeric codes
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_by_key(|t| (t.bytes().all(|c| c.is_ascii_digit()), *t));
        tags
    }

    /// Significant fields of a record, looked up by its type
    pub fn significant_fields(&self, record: &Record) -> Record {
        let tag = record.message_type().unwrap_or_default();
        (self.lookup(&tag).significant_fields)(record)
    }

    /// Render a record, looked up by its type
    pub fn render(&self, record: &Record, renderer: &Renderer, suffix: &str) -> String {
        let tag = record.message_type().unwrap_or_default();
        (self.lookup(&tag).render)(record, renderer, suffix)
    }
}

impl Default for Registry {
    /// A registry with all built-in message types
    fn default() -> Self {
        let mut r = Registry::empty();
        for (name, code, entry) in handlers::BUILTIN {
            r.register(*name, *entry);
            r.register(code.to_string(), *entry);
        }
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Value;

    fn record() -> Record {
        vec![
            ("type", Value::from("SYSCALL")),
            ("time", Value::Number(1600000000)),
            ("pid", Value::Number(1)),
            ("comm", Value::from("sh")),
            ("fsuid", Value::Number(0)),
            ("syscall", Value::Number(59)),
            ("exe", Value::from("/bin/sh")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn total_lookup() {
        let r = Registry::default();
        let renderer = Renderer::new(false, false, true);
        for tag in ["", "SYSCALL", "1300", "avc", "UNKNOWN[1234]"] {
            let e = r.lookup(tag);
            let out = (e.render)(&record(), &renderer, "");
            assert!(out.starts_with("[!] Unknown message type (type=SYSCALL)"));
            assert_eq!((e.significant_fields)(&record()).len(), 3);
        }
        assert!(r.is_registered("AVC"));
        assert!(r.is_registered("1400"));
        assert!(r.is_registered("SECCOMP"));
        assert!(r.is_registered("1326"));
        assert!(!r.is_registered("SYSCALL"));
        assert_eq!(r.tags(), vec!["AVC", "SECCOMP", "1326", "1400"]);
    }

    #[test]
    fn default_fields() {
        let s = default_significant_fields(&record());
        assert_eq!(
            s.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["type", "syscall", "exe"]
        );
    }

    #[test]
    fn default_rendering() {
        let out = Registry::empty().render(&record(), &Renderer::new(false, false, true), "");
        assert_eq!(
            out,
            "[!] Unknown message type (type=SYSCALL) at 2020-09-13 12:26:40\n\
             \x20   pid:     1\n\
             \x20   comm:    sh\n\
             \x20   fsuid:   0\n\
             \x20   syscall: 59\n\
             \x20   exe:     /bin/sh\n"
        );
    }

    #[test]
    fn reregister() {
        fn only_type(r: &Record) -> Record {
            r.subset(&["type"])
        }
        fn fixed(_: &Record, _: &Renderer, suffix: &str) -> String {
            format!("fixed{}\n", suffix)
        }
        let mut r = Registry::default();
        r.register(
            "SYSCALL",
            Entry {
                significant_fields: only_type,
                render: fixed,
            },
        );
        let renderer = Renderer::default();
        assert_eq!(r.render(&record(), &renderer, "(1)"), "fixed(1)\n");
        assert_eq!(r.significant_fields(&record()).len(), 1);
    }
}
