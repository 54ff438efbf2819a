//! 📂 Region Source — loads the ordered region-code list from a delimited file.
//!
//! The input files come from two different export tools; one writes UTF-8,
//! the other Windows-1252, and neither asked the other first. The loader
//! tries UTF-8, then falls back to Windows-1252 on invalid bytes. Exactly
//! these two encodings, in that order — a compatibility shim for a known
//! pair of tools, not an encoding séance. 🔮❌

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::common::RegionCode;
use crate::error::SourceError;

/// 📋 Reads region codes from the first column of `path`, skipping the
/// header row and any row whose first column is blank. File order is
/// preserved — the run counts through regions in whatever order the
/// spreadsheet dreamed up.
pub fn load(path: &Path) -> Result<Vec<RegionCode>, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
                source,
            }
        } else {
            SourceError::Malformed {
                path: path.to_path_buf(),
                reason: source.to_string(),
            }
        }
    })?;

    let text = decode(&bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut codes = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| SourceError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let first = row.get(0).ok_or_else(|| SourceError::Malformed {
            path: path.to_path_buf(),
            reason: "row without a first column".to_string(),
        })?;
        // -- 🫥 blank first column: not an error, just not a region
        if first.trim().is_empty() {
            continue;
        }
        codes.push(RegionCode::normalize(first));
    }

    debug!("📂 Loaded {} region codes from '{}'", codes.len(), path.display());
    Ok(codes)
}

// 🧓 UTF-8 first, Windows-1252 second, nothing third. The first decode
// that works, wins. Windows-1252 maps every byte to *something*, so the
// fallback cannot fail — it can only be wrong, which is the legacy
// spreadsheet experience in a nutshell.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Cow::Owned(text.into_owned())
        }
    }
}
