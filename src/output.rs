//! Reading and writing the JSON files that connect the stages.
//!
//! Listing files are UTF-8 JSON arrays, written with two-space indentation
//! and non-ASCII text left unescaped. A `.gz` suffix switches on gzip for
//! both directions. Tabular side outputs are appended as CSV.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::listing::Listing;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Reads a whole file, transparently gunzipping `.gz` paths.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut bytes = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }
    debug!(path = %path.display(), bytes = bytes.len(), "File read");
    Ok(bytes)
}

/// Decodes a JSON file into any deserializable value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Loads a listing file produced by an earlier stage.
pub fn read_listings(path: &Path) -> Result<Vec<Listing>> {
    let listings: Vec<Listing> = read_json(path)?;
    info!(path = %path.display(), count = listings.len(), "Listings loaded");
    Ok(listings)
}

/// Writes any serializable value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer_pretty(&mut encoder, value)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    Ok(())
}

pub fn write_listings(path: &Path, listings: &[Listing]) -> Result<()> {
    write_json(path, listings)?;
    info!(path = %path.display(), count = listings.len(), "Listings saved");
    Ok(())
}

/// Logs a run summary as pretty-printed JSON.
pub fn print_json<T: Serialize>(summary: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Appends records as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
