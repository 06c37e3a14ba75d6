use super::format::{self, AssetEntry, DecodedPackage, Reader};
use crate::common::{DEFAULT_MAX_PACKAGE_SIZE, DecodeError, MAX_ENTRY_PATH_LEN, MAX_MANIFEST_SIZE};
use crate::manifest::ThemeManifest;
use crate::validation::entry_relative_path;

/// Decodes `.reskin` packages held in memory.
///
/// The decoder never touches the disk or the network. [`decode`](Self::decode)
/// is what preview uses: it reads the header and manifest and ignores the
/// asset section. [`open`](Self::open) is what the installer uses: it also
/// validates every asset entry and rejects the whole package on the first
/// malformed or unsafe one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageDecoder {
    max_package_size: usize,
}

impl Default for PackageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PACKAGE_SIZE)
    }
}

impl PackageDecoder {
    pub fn new(max_package_size: usize) -> Self {
        Self { max_package_size }
    }

    pub fn max_package_size(&self) -> usize {
        self.max_package_size
    }

    /// Extracts and validates the embedded manifest.
    pub fn decode(&self, bytes: &[u8]) -> Result<ThemeManifest, DecodeError> {
        self.check_size(bytes)?;
        let mut reader = Reader::new(bytes);
        let manifest_json = format::read_header(&mut reader, MAX_MANIFEST_SIZE)?;
        ThemeManifest::from_json_slice(manifest_json)
    }

    /// Validates the whole package and returns a view over its entries.
    pub fn open<'a>(&self, bytes: &'a [u8]) -> Result<DecodedPackage<'a>, DecodeError> {
        self.check_size(bytes)?;
        let mut reader = Reader::new(bytes);
        let manifest_json = format::read_header(&mut reader, MAX_MANIFEST_SIZE)?;
        let manifest = ThemeManifest::from_json_slice(manifest_json)?;

        let mut entries = Vec::new();
        while !reader.is_empty() {
            entries.push(read_entry(&mut reader)?);
        }

        log::debug!(
            "Opened package '{}' with {} asset(s)",
            manifest.name,
            entries.len()
        );

        Ok(DecodedPackage { manifest, entries })
    }

    fn check_size(&self, bytes: &[u8]) -> Result<(), DecodeError> {
        if bytes.len() > self.max_package_size {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                limit: self.max_package_size,
            });
        }
        Ok(())
    }
}

fn read_entry<'a>(reader: &mut Reader<'a>) -> Result<AssetEntry<'a>, DecodeError> {
    let offset = reader.position();
    let malformed = |what: &str| DecodeError::MalformedEntry(format!("{what} at offset {offset}"));

    let path_len = reader
        .read_u32_le()
        .ok_or_else(|| malformed("truncated path length"))? as usize;

    if path_len == 0 || path_len > MAX_ENTRY_PATH_LEN {
        return Err(malformed(&format!("invalid path length {path_len}")));
    }

    let path_bytes = reader
        .take(path_len)
        .ok_or_else(|| malformed("truncated path"))?;
    let path = std::str::from_utf8(path_bytes)
        .map_err(|_| malformed("path is not valid UTF-8"))?
        .to_string();
    let relative_path = entry_relative_path(&path)?;

    let data_len = reader
        .read_u64_le()
        .ok_or_else(|| malformed("truncated data length"))?;
    let data = usize::try_from(data_len)
        .ok()
        .and_then(|len| reader.take(len))
        .ok_or_else(|| {
            malformed(&format!(
                "data length {data_len} for '{path}' exceeds the remaining package"
            ))
        })?;

    Ok(AssetEntry {
        path,
        relative_path,
        data,
    })
}
