//! Canonical JSON rendering
//!
//! Documents are pretty-printed with 4-space indentation before they reach a
//! partial file. The merger nests them verbatim under their ids, shifting each
//! embedded newline by one indentation level, so the merged file is exactly what
//! the same pretty-printer would produce for the whole id-sorted object.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::io::{self, Write};

const INDENT: &[u8] = b"    ";

/// Serialize `value` the way every artifact document must be serialized.
pub fn to_document_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(serde::ser::Error::custom)
}

/// Write the canonical object for `entries` (id -> serialized document).
///
/// No trailing newline. An empty map renders as `{}`.
pub fn write_canonical<W: Write>(entries: &BTreeMap<String, String>, out: &mut W) -> io::Result<()> {
    if entries.is_empty() {
        return out.write_all(b"{}");
    }
    out.write_all(b"{\n")?;
    let last = entries.len() - 1;
    for (i, (id, document)) in entries.iter().enumerate() {
        let key = serde_json::to_string(id)?;
        out.write_all(INDENT)?;
        out.write_all(key.as_bytes())?;
        out.write_all(b": ")?;
        out.write_all(document.replace('\n', "\n    ").as_bytes())?;
        if i < last {
            out.write_all(b",")?;
        }
        out.write_all(b"\n")?;
    }
    out.write_all(b"}")
}
