//! The built-in transformation registry.
//!
//! Stands in for the out-of-scope dynamic-loading mechanism (spec §1):
//! instead of `dlopen`-ing a shared object per stage name, [`lookup`]
//! resolves a name to a [`Transform`] from a fixed table. Behavior for each
//! name is grounded byte-for-byte in the corresponding original plugin
//! (`examples/original_source/plugins/*.c`) — every transform below walks
//! `Record`'s raw bytes, not Unicode scalars, matching the original's `char`
//! array indexing.

use crate::record::Record;
use crate::stage::Transform;
use std::thread;
use std::time::Duration;

/// Resolves a stage name to its transform, or `None` if the name is
/// unknown. Unknown names are an argument error at the host boundary
/// (spec §6), not a queue/stage error.
#[must_use]
pub fn lookup(name: &str) -> Option<Transform> {
    match name {
        "uppercase" => Some(Box::new(uppercase)),
        "reverse" => Some(Box::new(reverse)),
        "rotate" => Some(Box::new(rotate)),
        "expand" => Some(Box::new(expand)),
        "log" => Some(Box::new(log_passthrough)),
        "typewriter" => Some(Box::new(typewriter)),
        _ => None,
    }
}

/// The stage names this registry resolves, for usage messages.
pub const NAMES: &[&str] = &["uppercase", "reverse", "rotate", "expand", "log", "typewriter"];

/// ASCII-uppercases every byte; non-ASCII bytes pass through unchanged,
/// matching `toupper`'s behavior in `uppercaser.c`.
fn uppercase(input: Record) -> Option<Record> {
    let bytes = input.into_bytes().into_iter().map(|b| b.to_ascii_uppercase()).collect();
    Some(Record::new(bytes))
}

/// Reverses the record byte-for-byte (`flipper.c`). A multi-byte UTF-8
/// sequence is reversed along with everything else, which is not generally
/// valid UTF-8 afterward — `Record` carries bytes, not text, so that's fine.
fn reverse(input: Record) -> Option<Record> {
    let mut bytes = input.into_bytes();
    bytes.reverse();
    Some(Record::new(bytes))
}

/// Moves the last byte to the front, shifting the rest right by one. A
/// record of length 0 or 1 is returned unchanged (`rotator.c`).
fn rotate(input: Record) -> Option<Record> {
    let mut bytes = input.into_bytes();
    if bytes.len() <= 1 {
        return Some(Record::new(bytes));
    }
    let last = bytes.pop().expect("checked non-empty above");
    bytes.insert(0, last);
    Some(Record::new(bytes))
}

/// Inserts a single space between adjacent bytes; no leading or trailing
/// space (`expander.c`).
fn expand(input: Record) -> Option<Record> {
    let bytes = input.into_bytes();
    if bytes.is_empty() {
        return Some(Record::new(bytes));
    }
    let mut out = Vec::with_capacity(bytes.len() * 2);
    let mut iter = bytes.into_iter().peekable();
    while let Some(b) = iter.next() {
        out.push(b);
        if iter.peek().is_some() {
            out.push(b' ');
        }
    }
    Some(Record::new(out))
}

/// Identity pass-through: prints the record to stdout and forwards it
/// unchanged (`logger.c`). This is pipeline payload output, not the host's
/// own diagnostic logging, so it writes directly rather than going through
/// the `log` facade.
fn log_passthrough(input: Record) -> Option<Record> {
    println!("[logger] {input}");
    Some(input)
}

/// Identity pass-through: "types" the record to stdout one byte at a time
/// with a 100ms delay between bytes, then a newline, then forwards it
/// unchanged (`typewriter.c`).
fn typewriter(input: Record) -> Option<Record> {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    for b in input.as_bytes() {
        let _ = stdout.write_all(&[*b]);
        let _ = stdout.flush();
        thread::sleep(Duration::from_millis(100));
    }
    println!();
    Some(input)
}
