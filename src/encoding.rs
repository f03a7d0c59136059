//! Text encoding detection and in-place normalization to UTF-8.
//!
//! Files already in UTF-8 or plain ASCII are left untouched. Anything else is
//! decoded with the detected codec, re-written as UTF-8 through a temp file,
//! and the original is kept under a sibling `oldEncodeTables/` directory.

use crate::error::{Error, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the directory that receives pre-conversion originals.
pub const BACKUP_DIR: &str = "oldEncodeTables";

/// Detected codec of a file's raw bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detected {
    /// Every byte is < 0x80
    Ascii,
    /// Valid UTF-8; `bom` is true when a UTF-8 BOM prefix is present
    Utf8 { bom: bool },
    /// Some other codec, as guessed by the statistical detector or a BOM
    Other(&'static Encoding),
}

impl Detected {
    /// Codec name for user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            Detected::Ascii => "ascii",
            Detected::Utf8 { .. } => UTF_8.name(),
            Detected::Other(enc) => enc.name(),
        }
    }

    /// Whether the file content has to be re-written.
    ///
    /// UTF-8 with a BOM still converts: the BOM is what broke the downstream
    /// consumers in the first place.
    pub fn needs_conversion(&self) -> bool {
        !matches!(self, Detected::Ascii | Detected::Utf8 { bom: false })
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            Detected::Ascii | Detected::Utf8 { .. } => UTF_8,
            Detected::Other(enc) => enc,
        }
    }
}

/// Outcome of [`normalize_file`]
#[derive(Debug)]
pub enum Conversion {
    /// File is already UTF-8/ASCII, nothing was written
    NoChange { detected: &'static str },
    /// File was transcoded in place; the original bytes live at `backup`
    Converted {
        from: &'static str,
        backup: PathBuf,
    },
}

/// Detect the codec of raw file bytes.
///
/// A byte-order mark wins over the statistical guess.
pub fn detect(raw: &[u8]) -> Detected {
    if raw.is_ascii() {
        return Detected::Ascii;
    }
    if let Some((enc, _bom_len)) = Encoding::for_bom(raw) {
        if enc == UTF_8 {
            return Detected::Utf8 { bom: true };
        }
        return Detected::Other(enc);
    }
    let mut detector = EncodingDetector::new();
    detector.feed(raw, true);
    let guess = detector.guess(None, true);
    if guess == UTF_8 {
        Detected::Utf8 { bom: false }
    } else {
        Detected::Other(guess)
    }
}

/// Detect the codec of a file on disk.
pub fn detect_file(path: &Path) -> Result<Detected> {
    Ok(detect(&fs::read(path)?))
}

/// Normalize a file to UTF-8 in place.
///
/// The original file is moved to `<dir>/oldEncodeTables/<stem>_oldEnc.txt`
/// before the transcoded temp file takes its path, so a failure anywhere
/// leaves the primary path either untouched or fully converted.
pub fn normalize_file(path: &Path) -> Result<Conversion> {
    let raw = fs::read(path)?;
    let detected = detect(&raw);
    if !detected.needs_conversion() {
        return Ok(Conversion::NoChange {
            detected: detected.name(),
        });
    }

    let codec = detected.encoding();
    let (text, _, malformed) = codec.decode(&raw);
    if malformed {
        return Err(Error::Decode {
            path: path.to_path_buf(),
            codec: codec.name().to_string(),
        });
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;

    let backup = backup_path(path);
    fs::create_dir_all(dir.join(BACKUP_DIR))?;
    fs::rename(path, &backup)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(Conversion::Converted {
        from: detected.name(),
        backup,
    })
}

/// Backup location for a file: sibling `oldEncodeTables/` directory, original
/// extension replaced by `_oldEnc.txt`.
pub fn backup_path(path: &Path) -> PathBuf {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(BACKUP_DIR).join(format!("{stem}_oldEnc.txt"))
}
