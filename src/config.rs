use std::fmt::{self, Display};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use getopts::{Matches, Options};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coalesce::{Mode, Settings};
use crate::filter::Filter;
use crate::registry::Registry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0}")]
    Args(#[from] getopts::Fail),
    #[error("invalid value for --{option}: {value}")]
    InvalidNumber { option: &'static str, value: String },
    #[error("--exclude and --only are mutually exclusive")]
    ConflictingFilters,
    #[error("unknown message type {0}")]
    UnknownType(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilterConfig {
    pub since: Option<u64>,
    pub until: Option<u64>,
    pub exclude: Vec<String>,
    pub only: Vec<String>,
    pub hide_unknown: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub verbose: bool,
    pub merge: bool,
    pub count: bool,
    /// Defaults to whether standard output is a terminal
    pub color: Option<bool>,
    pub utc: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "since={} until={} exclude={:?} only={:?} hide-unknown={} \
             verbose={} merge={} count={} color={:?} utc={}",
            self.filter.since.unwrap_or(0),
            self.filter.until.unwrap_or(u64::MAX),
            self.filter.exclude,
            self.filter.only,
            self.filter.hide_unknown,
            self.output.verbose,
            self.output.merge,
            self.output.count,
            self.output.color,
            self.output.utc,
        )
    }
}

/// Command line options
pub fn options() -> Options {
    let mut opts = Options::new();
    opts.optopt("s", "since", "Show only entries since this UNIX timestamp", "TIME");
    opts.optopt("u", "until", "Show only entries until this UNIX timestamp", "TIME");
    opts.optmulti(
        "e",
        "exclude",
        "Skip messages with this type; can be specified multiple times. \
         Names and numeric codes (AVC, 1400) are matched separately",
        "TYPE",
    );
    opts.optmulti(
        "i",
        "only",
        "Print only messages with this type; can be specified multiple times. \
         Names and numeric codes (AVC, 1400) are matched separately",
        "TYPE",
    );
    opts.optflag("", "hide-unknown", "Hide messages with unknown type");
    opts.optflag("v", "verbose", "Include fields hidden by default");
    opts.optflag("m", "merge", "Print similar events only once");
    opts.optflag("c", "count", "Count similar events and print them at end of input");
    opts.optflag("", "color", "Use ANSI escape codes to color output");
    opts.optflag("", "no-color", "Don't use ANSI escape codes to color output");
    opts.optflag("", "utc", "Show timestamps in UTC instead of local time");
    opts.optopt("", "config", "Read defaults from configuration file", "FILE");
    opts.optflag("d", "debug", "Log diagnostic messages");
    opts.optflag("h", "help", "Show this text and exit");
    opts.optflag("V", "version", "Show version and exit");
    opts
}

/// Parse a time bound. Negative values are before any event and are
/// clamped to 0.
fn parse_time(matches: &Matches, option: &'static str) -> Result<Option<u64>, ConfigError> {
    matches
        .opt_str(option)
        .map(|value| {
            let text = value.trim();
            let parsed = text
                .parse::<u64>()
                .or_else(|_| text.parse::<i64>().map(|n| n.max(0) as u64));
            parsed.map_err(|_| ConfigError::InvalidNumber { option, value })
        })
        .transpose()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override configuration with command line options. Type lists
    /// given on the command line replace those from the file.
    pub fn apply_matches(&mut self, matches: &Matches) -> Result<(), ConfigError> {
        if let Some(since) = parse_time(matches, "since")? {
            self.filter.since = Some(since);
        }
        if let Some(until) = parse_time(matches, "until")? {
            self.filter.until = Some(until);
        }
        let exclude = matches.opt_strs("exclude");
        if !exclude.is_empty() {
            self.filter.exclude = exclude;
        }
        let only = matches.opt_strs("only");
        if !only.is_empty() {
            self.filter.only = only;
        }
        self.filter.hide_unknown |= matches.opt_present("hide-unknown");
        self.output.verbose |= matches.opt_present("verbose");
        self.output.merge |= matches.opt_present("merge");
        self.output.count |= matches.opt_present("count");
        self.output.utc |= matches.opt_present("utc");
        // the last of --color and --no-color wins
        let last = |name| matches.opt_positions(name).into_iter().max();
        match (last("color"), last("no-color")) {
            (Some(on), Some(off)) => self.output.color = Some(on > off),
            (Some(_), None) => self.output.color = Some(true),
            (None, Some(_)) => self.output.color = Some(false),
            (None, None) => (),
        }
        Ok(())
    }

    /// Validate configuration and turn it into [`Settings`].
    /// `is_terminal` decides coloring if not configured explicitly.
    pub fn make_settings(
        &self,
        registry: &Registry,
        is_terminal: bool,
    ) -> Result<Settings, ConfigError> {
        let f = &self.filter;
        if !f.exclude.is_empty() && !f.only.is_empty() {
            return Err(ConfigError::ConflictingFilters);
        }
        if let Some(ty) = f
            .exclude
            .iter()
            .chain(f.only.iter())
            .find(|ty| !registry.is_registered(ty))
        {
            return Err(ConfigError::UnknownType(ty.clone()));
        }

        let mode = if self.output.count {
            Mode::Count
        } else if self.output.merge {
            Mode::Merge
        } else {
            Mode::Plain
        };

        Ok(Settings {
            filter: Filter {
                since: f.since.unwrap_or(0),
                until: f.until.unwrap_or(u64::MAX),
                exclude: f.exclude.iter().cloned().collect(),
                only: f.only.iter().cloned().collect(),
                hide_unknown: f.hide_unknown,
            },
            mode,
            verbose: self.output.verbose,
            color: self.output.color.unwrap_or(is_terminal),
            utc: self.output.utc,
        })
    }
}
