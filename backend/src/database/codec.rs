//! Reading and writing the books flat file.
//!
//! The file is UTF-8 CSV with a header row naming the [`Book`] fields. Rows
//! that cannot be decoded are skipped with a warning; a missing file, an I/O
//! failure or a header without the required columns fails the whole read.

use anyhow::{Context, Result, bail};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::models::{BOOK_COLUMNS, Book, MAX_RATING};

pub fn read_books(path: &Path) -> Result<Vec<Book>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_books(file, &path.display().to_string())
}

/// Decodes CSV from any reader. `origin` names the source in errors and logs.
pub fn parse_books<R: Read>(input: R, origin: &str) -> Result<Vec<Book>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", origin))?
        .clone();
    let missing: Vec<&str> = BOOK_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h.trim() == *column))
        .collect();
    if !missing.is_empty() {
        bail!("{} is missing columns: {}", origin, missing.join(", "));
    }

    let mut books = Vec::new();
    for (index, row) in reader.deserialize::<Book>().enumerate() {
        // Header is line 1
        let line = index + 2;
        match row {
            Ok(book) if book.rating <= MAX_RATING => books.push(book),
            Ok(book) => tracing::warn!(
                "Skipping {} row {}: rating {} out of range",
                origin,
                line,
                book.rating
            ),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(e).with_context(|| format!("Failed to read {}", origin));
            }
            Err(e) => tracing::warn!("Skipping {} row {}: {}", origin, line, e),
        }
    }

    Ok(books)
}

/// Writes `books` next to `path` and renames the result into place, so a
/// reader never observes a half-written file.
pub fn write_books(books: &[Book], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let staging = staging_path(path);
    let written = (|| -> Result<()> {
        let mut writer = csv::Writer::from_path(&staging)?;
        if books.is_empty() {
            writer.write_record(BOOK_COLUMNS)?;
        }
        for book in books {
            writer.serialize(book)?;
        }
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(e).with_context(|| format!("Failed to write {}", staging.display()));
    }

    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move {} into place", staging.display()))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "books.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
