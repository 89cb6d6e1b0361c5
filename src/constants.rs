//! Lookup tables for values found in audit records: system calls by
//! architecture, signals, error numbers and seccomp actions.

use std::collections::HashMap;

use lazy_static::lazy_static;
use nix::errno::Errno;
use nix::sys::signal::Signal;

use crate::types::Value;

include!(concat!(env!("OUT_DIR"), "/const.rs"));

/// `AUDIT_ARCH_X86_64`, assumed when a record does not carry `arch`
pub const DEFAULT_ARCH: &str = "c000003e";

lazy_static! {
    pub static ref SYSCALL_NAMES: HashMap<u32, HashMap<u32, &'static str>> = SYSCALLS
        .iter()
        .map(|(arch, table)| (*arch, table.iter().copied().collect()))
        .collect();
}

/// Interpret an `arch` field value.
///
/// The kernel prints the architecture as bare hex digits. Codes that
/// happen to consist of decimal digits only have been turned into
/// numbers by the tokenizer, so their decimal rendering is the hex
/// text we want.
pub fn arch_code(arch: &Value) -> Option<u32> {
    let text = arch.to_string();
    let text = text.strip_prefix("0x").unwrap_or(&text);
    u32::from_str_radix(text, 16).ok()
}

/// Resolve a system call number for the given architecture. Unknown
/// architectures or numbers yield the number itself.
pub fn syscall_name(nr: &Value, arch: &Value) -> String {
    let name = match (nr.as_u64(), arch_code(arch)) {
        (Some(nr), Some(arch)) => u32::try_from(nr)
            .ok()
            .and_then(|nr| SYSCALL_NAMES.get(&arch)?.get(&nr).copied()),
        _ => None,
    };
    match name {
        Some(name) => name.to_string(),
        None => nr.to_string(),
    }
}

/// Resolve a signal number to its symbolic name, e.g. `SIGSYS`.
pub fn signal_name(nr: u64) -> String {
    i32::try_from(nr)
        .ok()
        .and_then(|n| Signal::try_from(n).ok())
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| format!("signal {}", nr))
}

/// Describe an error number, e.g. `Operation not permitted`.
pub fn errno_string(code: u64) -> String {
    match i32::try_from(code).map(Errno::from_raw) {
        Ok(e) if e != Errno::UnknownErrno => e.desc().to_string(),
        _ => format!("Unknown error {}", code),
    }
}

pub mod seccomp {
    //! Seccomp filter return values, see _seccomp(2)_.
    pub const RET_ACTION_FULL: u64 = 0xffff_0000;
    pub const RET_DATA: u64 = 0x0000_ffff;

    pub const RET_KILL_PROCESS: u64 = 0x8000_0000;
    pub const RET_KILL_THREAD: u64 = 0x0000_0000;
    pub const RET_TRAP: u64 = 0x0003_0000;
    pub const RET_ERRNO: u64 = 0x0005_0000;
    pub const RET_USER_NOTIF: u64 = 0x7fc0_0000;
    pub const RET_TRACE: u64 = 0x7ff0_0000;
    pub const RET_LOG: u64 = 0x7ffc_0000;
    pub const RET_ALLOW: u64 = 0x7fff_0000;

    /// Name of the action encoded in a seccomp return value
    pub fn action_name(code: u64) -> Option<&'static str> {
        match code & RET_ACTION_FULL {
            RET_KILL_PROCESS => Some("kill-process"),
            RET_KILL_THREAD => Some("kill-thread"),
            RET_TRAP => Some("trap"),
            RET_ERRNO => Some("errno"),
            RET_USER_NOTIF => Some("user-notif"),
            RET_TRACE => Some("trace"),
            RET_LOG => Some("log"),
            RET_ALLOW => Some("allow"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tables() {
        assert_eq!(SYSCALL_NAMES[&0xc000003e][&59], "execve");
        assert_eq!(SYSCALL_NAMES[&0xc000003e][&317], "seccomp");
        assert_eq!(SYSCALL_NAMES[&0xc00000b7][&221], "execve");
    }

    #[test]
    fn syscalls() {
        let x86_64 = Value::from(DEFAULT_ARCH);
        assert_eq!(syscall_name(&Value::Number(59), &x86_64), "execve");
        assert_eq!(syscall_name(&Value::Number(0), &x86_64), "read");
        assert_eq!(syscall_name(&Value::Number(9999), &x86_64), "9999");
        assert_eq!(
            syscall_name(&Value::Number(221), &Value::from("c00000b7")),
            "execve"
        );
        // unknown architecture, numeric arch code
        assert_eq!(syscall_name(&Value::Number(11), &Value::Number(40000003)), "11");
        assert_eq!(syscall_name(&Value::from("bogus"), &x86_64), "bogus");
    }

    #[test]
    fn arch() {
        assert_eq!(arch_code(&Value::from("c000003e")), Some(0xc000003e));
        assert_eq!(arch_code(&Value::Number(40000003)), Some(0x40000003));
        assert_eq!(arch_code(&Value::from("x86_64")), None);
    }

    #[test]
    fn signals() {
        assert_eq!(signal_name(31), "SIGSYS");
        assert_eq!(signal_name(9), "SIGKILL");
        assert_eq!(signal_name(1000), "signal 1000");
    }

    #[test]
    fn errnos() {
        assert_eq!(errno_string(1), "Operation not permitted");
        assert_eq!(errno_string(13), "Permission denied");
        assert_eq!(errno_string(1 << 40), format!("Unknown error {}", 1u64 << 40));
    }

    #[test]
    fn seccomp_actions() {
        use super::seccomp::*;
        assert_eq!(action_name(0x7fff0000), Some("allow"));
        assert_eq!(action_name(0x00050001), Some("errno"));
        assert_eq!(action_name(0), Some("kill-thread"));
        assert_eq!(action_name(0x12340000), None);
    }
}
