use std::collections::HashSet;

use crate::registry::Registry;
use crate::types::Record;

/// Decides which records are shown at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    /// Earliest event time, inclusive
    pub since: u64,
    /// Latest event time, inclusive
    pub until: u64,
    /// Message types to skip; exclusive with `only`
    pub exclude: HashSet<String>,
    /// If non-empty, the only message types to show
    pub only: HashSet<String>,
    /// Skip message types without a registered handler
    pub hide_unknown: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            since: 0,
            until: u64::MAX,
            exclude: HashSet::new(),
            only: HashSet::new(),
            hide_unknown: false,
        }
    }
}

impl Filter {
    fn is_unbounded(&self) -> bool {
        self.since == 0 && self.until == u64::MAX
    }

    /// Check the time window. Records without a usable time only
    /// pass an unbounded window.
    fn in_window(&self, record: &Record) -> bool {
        match record.time() {
            Some(t) => self.since <= t && t <= self.until,
            None => self.is_unbounded(),
        }
    }

    pub fn should_process(&self, registry: &Registry, record: Option<&Record>) -> bool {
        let record = match record {
            Some(r) => r,
            None => return false,
        };

        if !self.in_window(record) {
            return false;
        }

        let ty = match record.message_type() {
            Some(ty) => ty,
            None => return false,
        };

        if !self.exclude.is_empty() && self.exclude.contains(&ty)
            || !self.only.is_empty() && !self.only.contains(&ty)
        {
            return false;
        }

        if self.hide_unknown && !registry.is_registered(&ty) {
            return false;
        }

        true
    }
}
