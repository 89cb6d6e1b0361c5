//! audit-pretty reads Linux audit log records and prints the ones it
//! knows about in a form meant for humans.

use std::env;
use std::error::Error;
use std::io::{self, BufWriter, IsTerminal, Write};

use signal_hook::consts::SIGINT;

use audit_pretty::coalesce::Coalesce;
use audit_pretty::config::{self, Config, ConfigError};
use audit_pretty::input;
use audit_pretty::logger;
use audit_pretty::registry::Registry;

fn run_app() -> Result<(), Box<dyn Error>> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "audit-pretty".into());

    let opts = config::options();
    let matches = opts.parse(env::args().skip(1));
    logger::init(matches.as_ref().map_or(false, |m| m.opt_present("debug")))?;
    let matches = matches.map_err(ConfigError::from)?;

    let registry = Registry::default();

    if matches.opt_present("help") {
        let brief = format!("Usage: {} [options] [FILE...]", program);
        println!("{}", opts.usage(&brief));
        println!("Reads standard input if no FILE is given or FILE is -.");
        println!("Known message types: {}", registry.tags().join(", "));
        return Ok(());
    }

    if matches.opt_present("version") {
        println!("audit-pretty {}", audit_pretty::VERSION);
        return Ok(());
    }

    let mut config = match matches.opt_str("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_matches(&matches)?;
    let settings = config.make_settings(&registry, io::stdout().is_terminal())?;
    log::debug!("running with config {}", &config);

    // safety: the handler only calls _exit(2), which is
    // async-signal-safe. Pending counts are discarded.
    unsafe { signal_hook::low_level::register(SIGINT, || signal_hook::low_level::exit(0)) }
        .map_err(|e| format!("register SIGINT handler: {}", e))?;

    let mut output = BufWriter::new(io::stdout().lock());
    let mut coalesce = Coalesce::new(move |block: &str| {
        output.write_all(block.as_bytes())?;
        output.write_all(b"\n")?;
        output.flush()
    })
    .with_registry(registry);
    coalesce.settings = settings;

    input::process_inputs(&mut coalesce, matches.free.as_slice())?;

    let stats = coalesce.stats;
    log::debug!(
        "processed {} lines, {} records, {} accepted, {} blocks written",
        stats.lines,
        stats.records,
        stats.accepted,
        stats.emitted
    );

    Ok(())
}

pub fn main() {
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "(unknown error)"
        };
        let location = match panic_info.location() {
            Some(l) => format!("{}:{},{}", l.file(), l.line(), l.column()),
            None => "(unknown)".to_string(),
        };
        log::error!("fatal error '{}' at {}", &message, &location);
    }));

    if let Err(e) = run_app() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
