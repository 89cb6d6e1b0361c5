use std::env;
use std::fs;
use std::io::prelude::*;
use std::io::BufReader;
use std::iter::FromIterator;
use std::path::Path;
use std::string::String;

/// Read a simple comma-separated table, skipping the header line,
/// blank lines and comments.
fn read_table(file: &str) -> Result<Vec<Vec<String>>, Box<dyn std::error::Error>> {
    let mut rows = Vec::new();
    for line in BufReader::new(fs::File::open(file)?).lines().skip(1) {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<String> = line.split(',').map(|x| x.trim().to_string()).collect();
        if fields.len() != 2 {
            return Err(format!("{}: malformed line: {}", file, line).into());
        }
        rows.push(fields);
    }
    Ok(rows)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("const.rs");
    let arch_file = "tables/arch.csv";

    let archs: Vec<(String, u32)> = read_table(arch_file)?
        .into_iter()
        .map(|fields| -> Result<_, Box<dyn std::error::Error>> {
            Ok((fields[0].clone(), u32::from_str_radix(&fields[1], 16)?))
        })
        .collect::<Result<_, _>>()?;

    let mut syscall_files = Vec::new();
    let mut tables = Vec::new();
    for (name, code) in &archs {
        let file = format!("tables/syscall-{}.csv", name);
        let entries: Vec<(u32, String)> = read_table(&file)?
            .into_iter()
            .map(|fields| -> Result<_, Box<dyn std::error::Error>> {
                Ok((fields[0].parse::<u32>()?, fields[1].clone()))
            })
            .collect::<Result<_, _>>()?;
        tables.push((*code, entries));
        syscall_files.push(file);
    }

    let mut template = Vec::new();
    fs::File::open("src/const.rs.in")?.read_to_end(&mut template)?;
    let template = String::from_utf8(template)?;

    let buf = template
        .replace(
            "/* @SYSCALLS@ */",
            String::from_iter(tables.iter().map(|(code, entries)| {
                format!(
                    "(0x{:08x}, &[{}]),\n",
                    code,
                    String::from_iter(
                        entries
                            .iter()
                            .map(|(nr, name)| format!(r#"({}, "{}"), "#, nr, name))
                    )
                )
            }))
            .as_str(),
        )
        .into_bytes();

    fs::write(&dest_path, buf)?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/const.rs.in");
    println!("cargo:rerun-if-changed={}", arch_file);
    for file in &syscall_files {
        println!("cargo:rerun-if-changed={}", file);
    }

    Ok(())
}
