use crate::common::limits::HEADER_LEN;
use crate::common::{DecodeError, PACKAGE_MAGIC};
use crate::manifest::ThemeManifest;
use std::path::PathBuf;

/// One validated asset inside a package, borrowing its data from the package bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry<'a> {
    /// Path as stored in the package
    pub path: String,
    /// Path relative to the theme directory, with platform separators
    pub relative_path: PathBuf,
    pub data: &'a [u8],
}

/// A package whose manifest and every asset entry passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPackage<'a> {
    pub manifest: ThemeManifest,
    pub entries: Vec<AssetEntry<'a>>,
}

impl DecodedPackage<'_> {
    /// Total size of the asset data, excluding headers.
    pub fn asset_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.data.len() as u64).sum()
    }
}

/// Forward-only cursor over package bytes.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes `len` bytes, or `None` without advancing if fewer remain.
    pub(crate) fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Some(slice)
    }

    pub(crate) fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Some(u32::from_le_bytes(buf))
    }

    pub(crate) fn read_u64_le(&mut self) -> Option<u64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Some(u64::from_le_bytes(buf))
    }
}

/// Reads the fixed header and returns the raw manifest bytes.
pub(crate) fn read_header<'a>(
    reader: &mut Reader<'a>,
    max_manifest: usize,
) -> Result<&'a [u8], DecodeError> {
    if reader.remaining() < HEADER_LEN {
        return Err(DecodeError::Truncated("too small".to_string()));
    }

    match reader.take(PACKAGE_MAGIC.len()) {
        Some(magic) if magic == PACKAGE_MAGIC => {}
        _ => return Err(DecodeError::BadMagic),
    }

    let declared = reader
        .read_u64_le()
        .ok_or_else(|| DecodeError::Truncated("missing manifest length".to_string()))?;

    if declared > max_manifest as u64 {
        return Err(DecodeError::ManifestTooLarge {
            size: declared,
            limit: max_manifest,
        });
    }

    let available = reader.remaining();
    let len = usize::try_from(declared).map_err(|_| DecodeError::ManifestSizeMismatch {
        declared,
        available,
    })?;

    reader
        .take(len)
        .ok_or(DecodeError::ManifestSizeMismatch {
            declared,
            available,
        })
}

pub(crate) fn write_header(out: &mut Vec<u8>, manifest_json: &[u8]) {
    out.extend_from_slice(PACKAGE_MAGIC);
    out.extend_from_slice(&(manifest_json.len() as u64).to_le_bytes());
    out.extend_from_slice(manifest_json);
}

pub(crate) fn write_entry(out: &mut Vec<u8>, path: &str, data: &[u8]) {
    out.extend_from_slice(&(path.len() as u32).to_le_bytes());
    out.extend_from_slice(path.as_bytes());
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_does_not_advance_past_end() {
        let bytes = [1u8, 2, 3];
        let mut reader = Reader::new(&bytes);

        assert_eq!(reader.read_u32_le(), None);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.take(2), Some(&bytes[..2]));
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_header_layout() {
        let mut out = Vec::new();
        write_header(&mut out, b"{}");

        assert_eq!(&out[..4], b"RSKN");
        assert_eq!(&out[4..12], &2u64.to_le_bytes());
        assert_eq!(&out[12..], b"{}");

        let mut reader = Reader::new(&out);
        assert_eq!(read_header(&mut reader, 1024).unwrap(), b"{}");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_entry_layout() {
        let mut out = Vec::new();
        write_entry(&mut out, "a.css", b"body{}");

        let mut reader = Reader::new(&out);
        assert_eq!(reader.read_u32_le(), Some(5));
        assert_eq!(reader.take(5), Some(&b"a.css"[..]));
        assert_eq!(reader.read_u64_le(), Some(6));
        assert_eq!(reader.take(6), Some(&b"body{}"[..]));
    }
}
