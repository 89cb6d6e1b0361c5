use nom::{
    branch::*, bytes::complete::*, character::complete::*, combinator::*, multi::*,
    sequence::*, IResult,
};

use crate::types::*;

/// Parse a single log line as written by _auditd(8)_ or found in the
/// kernel message buffer.
///
/// Returns `None` for anything that does not look like an audit
/// message; such lines are expected noise and never an error.
pub fn parse(line: &str) -> Option<Record> {
    let line = line.trim();
    if line.is_empty() || !line.contains("audit") {
        return None;
    }

    let (body, (ty, seconds)) = match parse_line_header(line) {
        Ok(r) => r,
        Err(_) => return None,
    };
    if body.is_empty() {
        return None;
    }

    let normalized = format!("type={} time={} {}", ty, seconds, body);
    Some(parse_body(&normalized))
}

/// Recognize the header of a message, with an optional kernel
/// timestamp prefix. Returns type tag and seconds part of the event
/// identifier; the rest of the input is the body.
#[inline(always)]
fn parse_line_header(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(opt(parse_kernel_prefix), parse_header)(input)
}

/// Recognize the `[12345.678901] audit: ` prefix used by dmesg
#[inline(always)]
fn parse_kernel_prefix(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag("["),
        digit1,
        tag("."),
        digit1,
        tag("] audit: "),
    )))(input)
}

/// Recognize `type=… [msg=]audit(sec.frac:seq): `
#[inline(always)]
fn parse_header(input: &str) -> IResult<&str, (&str, &str)> {
    map(
        tuple((
            preceded(tag("type="), take_while1(is_type_chr)),
            tag(" "),
            opt(tag("msg=")),
            tag("audit("),
            terminated(digit1, tuple((tag("."), digit1, tag(":"), digit1))),
            tag("): "),
        )),
        |(ty, _, _, _, seconds, _)| (ty, seconds),
    )(input)
}

/// Collect all key/value pairs from the body. Anything that is not a
/// key/value pair is skipped one character at a time.
#[inline(always)]
fn parse_body(input: &str) -> Record {
    let kvs: IResult<&str, Record> = fold_many0(
        alt((map(parse_kv, Some), value(None, anychar))),
        Record::new,
        |mut record, kv| {
            if let Some((k, v)) = kv {
                record.insert(k, coerce(v));
            }
            record
        },
    )(input);
    kvs.map(|(_, record)| record).unwrap_or_default()
}

/// Recognize one key/value pair
#[inline(always)]
fn parse_kv(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(is_key_chr),
        tag("="),
        alt((parse_quoted, parse_unquoted)),
    )(input)
}

/// Recognize double-quoted value, strip quotes
#[inline(always)]
fn parse_quoted(input: &str) -> IResult<&str, &str> {
    delimited(tag("\""), take_while(|c| c != '"'), tag("\""))(input)
}

/// Recognize unquoted value: anything up to the next space
#[inline(always)]
fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c != ' ')(input)
}

/// Turn decimal and `0x`-prefixed hexadecimal strings into numbers.
/// Values that don't fit stay strings.
fn coerce(v: &str) -> Value {
    if !v.is_empty() && v.bytes().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = v.parse::<u64>() {
            return Value::Number(n);
        }
    } else if let Some(hex) = v.strip_prefix("0x") {
        if !hex.is_empty() && hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            if let Ok(n) = u64::from_str_radix(hex, 16) {
                return Value::Number(n);
            }
        }
    }
    Value::Str(v.to_string())
}

/// Characters permitted in message type tags
#[inline(always)]
fn is_type_chr(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_uppercase() || c == '_'
}

/// Characters permitted in keys
#[inline(always)]
fn is_key_chr(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-'
}
