use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Deserializes a camelCase JSON request from `path`, or from stdin when the
/// path is `-`.
pub fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if path == Path::new("-") {
        return Ok(serde_json::from_reader(io::stdin().lock())?);
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a raw wire message (MT text or ISO XML) from `path`, `-` meaning stdin.
pub fn read_message(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path == Path::new("-") {
        io::stdin().lock().read_to_string(&mut text)?;
    } else {
        File::open(path)?.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Pretty-prints `value` followed by a newline.
pub fn write_response<W: Write, T: Serialize>(mut sink: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, value)?;
    writeln!(sink)?;
    Ok(())
}
