use std::fmt::{Display, Write};

use chrono::{DateTime, Local, Utc};

use crate::style::{Palette, Style};

/// Shown for declared fields that are missing from a record
pub const PLACEHOLDER: &str = "?";

/// Shown instead of the event time if a record has none
const NO_TIME: &str = "unknown time";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    Info,
    Warn,
}

impl Urgency {
    fn marker(&self) -> &'static str {
        match self {
            Urgency::Info => "[i]",
            Urgency::Warn => "[!]",
        }
    }

    fn style(&self) -> Style {
        match self {
            Urgency::Info => Style::Info,
            Urgency::Warn => Style::Warn,
        }
    }
}

/// Human-readable description of one event: a label, the event time
/// and two ordered lists of fields. `extra` fields are only shown in
/// verbose mode.
#[derive(Clone, Debug)]
pub struct Block {
    label: String,
    time: Option<u64>,
    urgency: Urgency,
    info: Vec<(String, Option<String>)>,
    extra: Vec<(String, Option<String>)>,
}

impl Block {
    pub fn new<S: Into<String>>(label: S, urgency: Urgency) -> Self {
        Block {
            label: label.into(),
            time: None,
            urgency,
            info: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn time(mut self, time: Option<u64>) -> Self {
        self.time = time;
        self
    }

    pub fn info<K: Into<String>, V: Display>(mut self, key: K, value: Option<V>) -> Self {
        self.info.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn extra<K: Into<String>, V: Display>(mut self, key: K, value: Option<V>) -> Self {
        self.extra.push((key.into(), value.map(|v| v.to_string())));
        self
    }
}

/// Formats [`Block`]s as aligned text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Renderer {
    pub palette: Palette,
    pub verbose: bool,
    pub utc: bool,
}

impl Renderer {
    pub fn new(color: bool, verbose: bool, utc: bool) -> Self {
        Renderer {
            palette: Palette::new(color),
            verbose,
            utc,
        }
    }

    fn format_time(&self, time: Option<u64>) -> Option<String> {
        let dt = DateTime::<Utc>::from_timestamp(i64::try_from(time?).ok()?, 0)?;
        Some(if self.utc {
            dt.format(TIME_FORMAT).to_string()
        } else {
            dt.with_timezone(&Local).format(TIME_FORMAT).to_string()
        })
    }

    /// Render a block. The result consists of complete lines; `suffix`
    /// is appended to the header line verbatim.
    pub fn render(&self, block: &Block, suffix: &str) -> String {
        let p = &self.palette;
        let reset = p.get(Style::Reset);
        let mut out = String::new();

        let time = self
            .format_time(block.time)
            .unwrap_or_else(|| NO_TIME.to_string());
        let _ = write!(
            out,
            "{}{}{} {}{}{} at {}{}{}",
            p.get(block.urgency.style()),
            block.urgency.marker(),
            reset,
            p.get(Style::Label),
            block.label,
            reset,
            p.get(Style::Time),
            time,
            reset,
        );
        if !suffix.is_empty() {
            let _ = write!(out, " {}{}{}", p.get(Style::Suffix), suffix, reset);
        }
        out.push('\n');

        let fields: Vec<&(String, Option<String>)> = if self.verbose {
            block.info.iter().chain(block.extra.iter()).collect()
        } else {
            block.info.iter().collect()
        };
        let width = fields.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
        for (key, value) in fields {
            let _ = writeln!(
                out,
                "    {}{:<width$}{} {}",
                p.get(Style::Key),
                format!("{}:", key),
                reset,
                value.as_deref().unwrap_or(PLACEHOLDER),
                width = width,
            );
        }
        out
    }
}
