//! Message types with dedicated grouping and display rules.
//!
//! Each handler is registered under its symbolic name, as written by
//! _auditd(8)_, and its numeric code, as found in the kernel message
//! buffer.

use crate::registry::Entry;

pub mod apparmor;
pub mod seccomp;

pub const BUILTIN: &[(&str, u32, Entry)] = &[
    ("AVC", 1400, apparmor::ENTRY),
    ("SECCOMP", 1326, seccomp::ENTRY),
];
