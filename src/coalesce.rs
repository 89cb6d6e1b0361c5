use std::io;

use indexmap::IndexMap;

use thiserror::Error;

use crate::filter::Filter;
use crate::parser::parse;
use crate::registry::Registry;
use crate::render::Renderer;
use crate::types::*;

/// How repeated events are reported
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Show every event
    #[default]
    Plain,
    /// Show the first event of each group only
    Merge,
    /// Show one summary per group, with the number of occurrences,
    /// at the end of input
    Count,
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub filter: Filter,
    pub mode: Mode,
    pub verbose: bool,
    pub color: bool,
    pub utc: bool,
}

impl Settings {
    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.color, self.verbose, self.utc)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Lines read
    pub lines: u64,
    /// Lines recognized as audit records
    pub records: u64,
    /// Records that passed the filter
    pub accepted: u64,
    /// Blocks written
    pub emitted: u64,
}

#[derive(Debug, Error)]
pub enum CoalesceError {
    #[error("write output: {0}")]
    Output(#[from] io::Error),
}

/// Coalesce turns audit log lines into rendered events, suppressing
/// or counting repeated occurrences of equivalent events.
pub struct Coalesce<'a> {
    /// Groups seen so far, in order of first occurrence
    seen: IndexMap<EquivalenceKey, (Record, u64)>,
    /// Output function
    emit_fn: Box<dyn 'a + FnMut(&str) -> io::Result<()>>,
    registry: Registry,

    pub settings: Settings,
    pub stats: Stats,
}

impl<'a> Coalesce<'a> {
    pub fn new<F: 'a + FnMut(&str) -> io::Result<()>>(emit_fn: F) -> Self {
        Coalesce {
            seen: IndexMap::new(),
            emit_fn: Box::new(emit_fn),
            registry: Registry::default(),
            settings: Settings::default(),
            stats: Stats::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn emit(&mut self, record: &Record, suffix: &str) -> Result<(), CoalesceError> {
        let text = self
            .registry
            .render(record, &self.settings.renderer(), suffix);
        (self.emit_fn)(&text)?;
        self.stats.emitted += 1;
        Ok(())
    }

    /// Process a single line of input
    pub fn process_line(&mut self, line: &str) -> Result<(), CoalesceError> {
        self.stats.lines += 1;
        let record = parse(line);
        match &record {
            Some(_) => self.stats.records += 1,
            None => log::trace!("skipping line: {}", line.trim_end()),
        }
        if !self
            .settings
            .filter
            .should_process(&self.registry, record.as_ref())
        {
            return Ok(());
        }
        match record {
            Some(record) => self.process_record(record),
            None => Ok(()),
        }
    }

    /// Process a record that has passed the filter
    pub fn process_record(&mut self, record: Record) -> Result<(), CoalesceError> {
        self.stats.accepted += 1;
        if self.settings.mode == Mode::Plain {
            return self.emit(&record, "");
        }

        let significant = self.registry.significant_fields(&record);
        let key = EquivalenceKey::from(&significant);
        if let Some((_, count)) = self.seen.get_mut(&key) {
            *count += 1;
            return Ok(());
        }
        self.seen.insert(key, (significant, 1));

        if self.settings.mode == Mode::Merge {
            self.emit(&record, "")?;
        }
        Ok(())
    }

    /// Write summaries for all groups at end of input (count mode
    /// only) and forget all groups.
    pub fn flush(&mut self) -> Result<(), CoalesceError> {
        let seen = std::mem::take(&mut self.seen);
        if self.settings.mode != Mode::Count {
            return Ok(());
        }
        for (_, (record, count)) in seen {
            self.emit(&record, &format!("({})", count))?;
        }
        Ok(())
    }

    /// Number of occurrences per group, in order of first occurrence
    pub fn counts(&self) -> impl Iterator<Item = (&Record, u64)> {
        self.seen.values().map(|(r, c)| (r, *c))
    }
}
