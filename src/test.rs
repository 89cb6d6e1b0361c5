use std::cell::RefCell;
use std::error::Error;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::coalesce::{Coalesce, Mode, Settings};

fn process_text<T>(c: &mut Coalesce, text: T) -> Result<(), Box<dyn Error>>
where
    T: AsRef<[u8]>,
{
    for line in BufReader::new(text.as_ref()).lines() {
        c.process_line(&line?)?;
    }
    c.flush()?;
    Ok(())
}

/// Render a file the way the command line tool does: one block per
/// event, separated by empty lines.
fn render_file(txtfile: &Path, settings: Settings) -> Result<Vec<u8>, Box<dyn Error>> {
    let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let emit_fn = |block: &str| -> std::io::Result<()> {
        let mut b = buf.borrow_mut();
        b.extend_from_slice(block.as_bytes());
        b.push(b'\n');
        Ok(())
    };

    let mut c = Coalesce::new(emit_fn);
    c.settings = settings;
    process_text(&mut c, std::fs::read(txtfile)?)?;
    drop(c);

    let out = buf.borrow().clone();
    Ok(out)
}

#[test]
fn golden() -> Result<(), Box<dyn Error>> {
    let prefix: PathBuf = "src/testdata".parse()?;
    let do_write = std::env::var_os("WRITE_GOLDEN").is_some();

    for (file, mode, verbose) in &[
        ("seccomp.txt", Mode::Plain, false),
        ("apparmor.txt", Mode::Count, false),
        ("mixed.txt", Mode::Merge, true),
    ] {
        let settings = Settings {
            mode: *mode,
            verbose: *verbose,
            utc: true,
            ..Settings::default()
        };

        let txtfile = prefix.join(file);
        println!("processing {}", txtfile.to_string_lossy());
        let got = render_file(&txtfile, settings)?;

        let mut outfile = txtfile.clone();
        outfile.set_extension("out");

        if do_write {
            println!("writing {}", outfile.to_string_lossy());
            std::fs::write(outfile, &got)?;
        } else {
            println!("comparing against {}", outfile.to_string_lossy());
            let expected = std::fs::read(outfile)?;
            print!("     got = {}", String::from_utf8_lossy(&got));
            print!("expected = {}", String::from_utf8_lossy(&expected));
            assert!(got == expected);
        }
    }

    Ok(())
}

#[test]
fn golden_time_window() -> Result<(), Box<dyn Error>> {
    let mut settings = Settings {
        utc: true,
        ..Settings::default()
    };
    settings.filter.since = 1600000100;
    settings.filter.until = 1600000200;

    let got = render_file(Path::new("src/testdata/seccomp.txt"), settings)?;
    let got = String::from_utf8(got)?;
    let headers: Vec<&str> = got.lines().filter(|l| l.starts_with("[!]")).collect();
    assert_eq!(
        headers,
        vec![
            "[!] seccomp policy violation at 2020-09-13 12:28:20",
            "[!] seccomp policy violation at 2020-09-13 12:30:00",
        ]
    );
    Ok(())
}

#[test]
fn golden_type_filter() -> Result<(), Box<dyn Error>> {
    let mut settings = Settings {
        mode: Mode::Count,
        utc: true,
        ..Settings::default()
    };
    settings.filter.exclude.insert("SECCOMP".into());

    let got = render_file(Path::new("src/testdata/apparmor.txt"), settings)?;
    let got = String::from_utf8(got)?;
    assert!(!got.contains("seccomp"));
    assert!(got.starts_with("[!] AppArmor policy violation at unknown time (3)\n"));

    let mut settings = Settings {
        utc: true,
        ..Settings::default()
    };
    settings.filter.hide_unknown = true;
    let got = render_file(Path::new("src/testdata/mixed.txt"), settings)?;
    let got = String::from_utf8(got)?;
    assert!(!got.contains("USER_LOGIN"));
    assert_eq!(got.matches("AppArmor policy violation").count(), 2);
    Ok(())
}
