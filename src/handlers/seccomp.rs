use crate::constants::{self, seccomp::*, DEFAULT_ARCH};
use crate::registry::Entry;
use crate::render::{Block, Renderer, Urgency};
use crate::types::{Record, Value};

pub const ENTRY: Entry = Entry {
    significant_fields,
    render,
};

/// The same program hitting the same system call is the same event.
pub fn significant_fields(record: &Record) -> Record {
    record.subset(&["type", "exe", "syscall", "arch"])
}

/// Error number carried by the `code` field.
///
/// A code with action bits set is a seccomp return value; only
/// `SECCOMP_RET_ERRNO` carries an error number in its data part. A
/// code without action bits is taken as an error number.
fn errno(code: u64) -> Option<u64> {
    let e = if code & RET_ACTION_FULL == 0 {
        code
    } else if code & RET_ACTION_FULL == RET_ERRNO {
        code & RET_DATA
    } else {
        0
    };
    if e != 0 {
        Some(e)
    } else {
        None
    }
}

fn action(code: u64) -> String {
    action_name(code)
        .map(String::from)
        .unwrap_or_else(|| format!("0x{:x}", code))
}

pub fn render(record: &Record, renderer: &Renderer, suffix: &str) -> String {
    let default_arch = Value::from(DEFAULT_ARCH);
    let arch = record.get("arch").unwrap_or(&default_arch);
    let code = record.get_u64("code");

    let block = Block::new("seccomp policy violation", Urgency::Warn)
        .time(record.time())
        .info("Executable", record.get("exe"))
        .info(
            "Signal",
            record
                .get_u64("sig")
                .filter(|sig| *sig != 0)
                .map(constants::signal_name),
        )
        .info(
            "Errno",
            code.and_then(errno).map(constants::errno_string),
        )
        .info(
            "System call",
            record
                .get("syscall")
                .map(|nr| constants::syscall_name(nr, arch)),
        )
        .extra("User ID", record.get("uid"))
        .extra("Group ID", record.get("gid"))
        .extra("AUID", record.get("auid"))
        .extra("PID", record.get("pid"))
        .extra("Thread name", record.get("comm"))
        .extra("Action", code.map(action));
    renderer.render(&block, suffix)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;

    const LINE: &str = r#"type=SECCOMP msg=audit(1600000000.123:45): auid=1000 uid=1000 gid=1000 ses=4 pid=999 comm="bash" exe="/bin/bash" sig=0 arch=c000003e syscall=59 compat=0 ip=0x7f code=0x7fff0000"#;

    #[test]
    fn rendering() {
        let r = parse(LINE).unwrap();
        assert_eq!(
            render(&r, &Renderer::new(false, false, true), ""),
            "[!] seccomp policy violation at 2020-09-13 12:26:40\n\
             \x20   Executable:  /bin/bash\n\
             \x20   Signal:      ?\n\
             \x20   Errno:       ?\n\
             \x20   System call: execve\n"
        );
        assert_eq!(
            render(&r, &Renderer::new(false, true, true), "(2)"),
            "[!] seccomp policy violation at 2020-09-13 12:26:40 (2)\n\
             \x20   Executable:  /bin/bash\n\
             \x20   Signal:      ?\n\
             \x20   Errno:       ?\n\
             \x20   System call: execve\n\
             \x20   User ID:     1000\n\
             \x20   Group ID:    1000\n\
             \x20   AUID:        1000\n\
             \x20   PID:         999\n\
             \x20   Thread name: bash\n\
             \x20   Action:      allow\n"
        );
    }

    #[test]
    fn signal_and_errno() {
        let r = parse(&LINE.replace("sig=0", "sig=31").replace("0x7fff0000", "0x50001")).unwrap();
        let out = render(&r, &Renderer::new(false, false, true), "");
        assert!(out.contains("    Signal:      SIGSYS\n"));
        assert!(out.contains("    Errno:       Operation not permitted\n"));

        let r = parse(&LINE.replace("code=0x7fff0000", "code=13")).unwrap();
        let out = render(&r, &Renderer::new(false, false, true), "");
        assert!(out.contains("    Errno:       Permission denied\n"));
    }

    #[test]
    fn missing_fields() {
        let r = parse(r#"type=SECCOMP msg=audit(1600000000.123:45): pid=999 syscall=0"#).unwrap();
        let out = render(&r, &Renderer::new(false, true, true), "");
        assert_eq!(
            out,
            "[!] seccomp policy violation at 2020-09-13 12:26:40\n\
             \x20   Executable:  ?\n\
             \x20   Signal:      ?\n\
             \x20   Errno:       ?\n\
             \x20   System call: read\n\
             \x20   User ID:     ?\n\
             \x20   Group ID:    ?\n\
             \x20   AUID:        ?\n\
             \x20   PID:         999\n\
             \x20   Thread name: ?\n\
             \x20   Action:      ?\n"
        );
    }

    #[test]
    fn other_arch() {
        let r = parse(&LINE.replace("arch=c000003e syscall=59", "arch=c00000b7 syscall=221")).unwrap();
        let out = render(&r, &Renderer::new(false, false, true), "");
        assert!(out.contains("    System call: execve\n"));
    }

    #[test]
    fn grouping() {
        let r = parse(LINE).unwrap();
        let s = significant_fields(&r);
        assert_eq!(
            s.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["type", "exe", "arch", "syscall"]
        );
        // summaries are rendered from significant fields only
        let out = render(&s, &Renderer::new(false, false, true), "(5)");
        assert!(out.starts_with("[!] seccomp policy violation at unknown time (5)\n"));
        assert!(out.contains("    System call: execve\n"));
    }

    #[test]
    fn errno_codes() {
        assert_eq!(errno(0), None);
        assert_eq!(errno(1), Some(1));
        assert_eq!(errno(0x0005_000d), Some(13));
        assert_eq!(errno(0x0005_0000), None);
        assert_eq!(errno(0x7fff_0000), None);
        assert_eq!(errno(0x8000_0000), None);
    }
}
