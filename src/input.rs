use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use thiserror::Error;

use crate::coalesce::{Coalesce, CoalesceError};

/// Name that stands for standard input
pub const STDIN: &str = "-";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("open {name}: {source}")]
    Open { name: String, source: io::Error },
    #[error("read {name}: {source}")]
    Read { name: String, source: io::Error },
    #[error("{0}")]
    Output(#[from] CoalesceError),
}

/// `Ok(false)` once whoever reads our output has gone away
pub fn still_open(r: Result<(), CoalesceError>) -> Result<bool, CoalesceError> {
    match r {
        Ok(()) => Ok(true),
        Err(CoalesceError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open a named input; [`STDIN`] is standard input.
pub fn open(name: &str) -> Result<Box<dyn Read>, InputError> {
    if name == STDIN {
        return Ok(Box::new(io::stdin()));
    }
    File::open(name)
        .map(|f| Box::new(f) as Box<dyn Read>)
        .map_err(|source| InputError::Open {
            name: name.into(),
            source,
        })
}

/// Feed all lines of `input` to `coalesce`. Invalid UTF-8 is replaced,
/// not rejected. Returns `Ok(false)` if output was closed.
pub fn process_reader<R: Read>(
    coalesce: &mut Coalesce,
    name: &str,
    input: R,
) -> Result<bool, InputError> {
    // std::io::Stdin's buffer is only 8KB.
    let mut input = BufReader::with_capacity(1 << 20, input);
    let mut line: Vec<u8> = Vec::new();
    loop {
        line.clear();
        let n = input
            .read_until(b'\n', &mut line)
            .map_err(|source| InputError::Read {
                name: name.into(),
                source,
            })?;
        if n == 0 {
            return Ok(true);
        }
        if !still_open(coalesce.process_line(&String::from_utf8_lossy(&line)))? {
            return Ok(false);
        }
    }
}

/// Process the named inputs in order, standard input if there are
/// none, then flush. Stops early without error if output was closed.
pub fn process_inputs<S: AsRef<str>>(
    coalesce: &mut Coalesce,
    names: &[S],
) -> Result<(), InputError> {
    let names: Vec<&str> = if names.is_empty() {
        vec![STDIN]
    } else {
        names.iter().map(|n| n.as_ref()).collect()
    };
    for name in names {
        log::debug!("reading {}", name);
        if !process_reader(coalesce, name, open(name)?)? {
            log::debug!("output closed");
            return Ok(());
        }
    }
    if !still_open(coalesce.flush())? {
        log::debug!("output closed");
    }
    Ok(())
}
