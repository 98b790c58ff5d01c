//! The binary parser handles the parsing and generation of a
//! [`Dataset`](`crate::Dataset`) snapshot in binary format.
//!
//! The idea is to always support old binary formats as input but only
//! generate the newest binary format.
//!
//! Every snapshot starts with the magic bytes `SUBTI` followed by a
//! single version byte. The remaining bytes are split into sections,
//! each prefixed by its length as big-endian `u32`. Inside a section,
//! every record is again prefixed by its own total length.
use std::fmt::Display;

use tracing::error;

use crate::{u32_from_bytes, usize_to_u32, SubtiError, SubtiResult};

/// Magic bytes at the start of every snapshot
pub(crate) const MAGIC: [u8; 5] = *b"SUBTI";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum BinaryVersion {
    V1,
}

impl BinaryVersion {
    /// The version that is used when writing snapshots
    pub const CURRENT: BinaryVersion = BinaryVersion::V1;

    pub fn as_u8(self) -> u8 {
        match self {
            BinaryVersion::V1 => 1,
        }
    }
}

impl TryFrom<u8> for BinaryVersion {
    type Error = SubtiError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1u8 => Ok(BinaryVersion::V1),
            _ => Err(SubtiError::NotImplemented),
        }
    }
}

impl Display for BinaryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Bytes<'a> {
    data: &'a [u8],
    version: BinaryVersion,
}

impl<'a> Bytes<'a> {
    pub fn new(data: &'a [u8], version: BinaryVersion) -> Self {
        Self { data, version }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn version(&self) -> BinaryVersion {
        self.version
    }

    /// Splits off the next length-prefixed section
    ///
    /// Returns the section content and the remaining bytes
    pub fn section(&self) -> SubtiResult<(Bytes<'a>, Bytes<'a>)> {
        if self.len() < 4 {
            error!("Too few bytes for a section header");
            return Err(SubtiError::ParseBinaryError);
        }
        let section_len = u32_from_bytes(self.data) as usize;
        let end = 4 + section_len;
        if self.len() < end {
            error!(
                "Section claims {} bytes, but only {} are left",
                section_len,
                self.len() - 4
            );
            return Err(SubtiError::ParseBinaryError);
        }
        Ok((
            Bytes::new(&self.data[4..end], self.version),
            Bytes::new(&self.data[end..], self.version),
        ))
    }

    /// Iterates the length-prefixed records of a section
    pub fn records(&self) -> Records<'a> {
        Records {
            data: self.data,
            idx: 0,
        }
    }
}

/// Identifies the encoding version of the provided binary data
///
/// # Errors
///
/// This method can fail for the following reasons:
/// - Incorrect byte encoding: [`SubtiError::ParseBinaryError`]
/// - Invalid version: [`SubtiError::NotImplemented`]
pub(crate) fn version(bytes: &[u8]) -> SubtiResult<Bytes<'_>> {
    if bytes.len() < MAGIC.len() + 1 || bytes[0..MAGIC.len()] != MAGIC {
        error!("Binary data does not start with a snapshot header");
        return Err(SubtiError::ParseBinaryError);
    }
    let version = BinaryVersion::try_from(bytes[MAGIC.len()])?;
    Ok(Bytes::new(&bytes[MAGIC.len() + 1..], version))
}

/// Returns the snapshot header for the current version
pub(crate) fn header() -> Vec<u8> {
    let mut res = MAGIC.to_vec();
    res.push(BinaryVersion::CURRENT.as_u8());
    res
}

/// Appends a section to `res`, prefixed by its length
pub(crate) fn push_section(res: &mut Vec<u8>, mut section: Vec<u8>) {
    res.extend_from_slice(&usize_to_u32(section.len()).to_be_bytes());
    res.append(&mut section);
}

/// Appends a string, prefixed by its length as big-endian `u32`
pub(crate) fn push_str(res: &mut Vec<u8>, s: &str) {
    res.extend_from_slice(&usize_to_u32(s.len()).to_be_bytes());
    res.extend_from_slice(s.as_bytes());
}

/// Iterator of the length-prefixed records of a section
///
/// Each item contains the full record, including its length prefix
pub(crate) struct Records<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = SubtiResult<&'a [u8]>;
    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.data[self.idx..];
        if rest.is_empty() {
            return None;
        }
        if rest.len() < 4 {
            self.idx = self.data.len();
            return Some(Err(SubtiError::ParseBinaryError));
        }
        let record_len = u32_from_bytes(rest) as usize;
        if record_len < 4 || rest.len() < record_len {
            error!(
                "Invalid record length {} with {} bytes left",
                record_len,
                rest.len()
            );
            self.idx = self.data.len();
            return Some(Err(SubtiError::ParseBinaryError));
        }
        self.idx += record_len;
        Some(Ok(&rest[..record_len]))
    }
}

/// Sequential reader for the fields of a single record
pub(crate) struct Fields<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> Fields<'a> {
    /// Creates a reader that starts after the record's length prefix
    pub fn new(record: &'a [u8]) -> Self {
        Self {
            data: record,
            idx: 4,
        }
    }

    pub fn u8(&mut self) -> SubtiResult<u8> {
        let value = *self.data.get(self.idx).ok_or(SubtiError::ParseBinaryError)?;
        self.idx += 1;
        Ok(value)
    }

    pub fn string(&mut self) -> SubtiResult<String> {
        if self.data.len() < self.idx + 4 {
            return Err(SubtiError::ParseBinaryError);
        }
        let len = u32_from_bytes(&self.data[self.idx..]) as usize;
        let start = self.idx + 4;
        let Some(raw) = self.data.get(start..start + len) else {
            error!("String of {} bytes exceeds the record", len);
            return Err(SubtiError::ParseBinaryError);
        };
        let Ok(s) = String::from_utf8(raw.to_vec()) else {
            error!("Unable to parse a string field");
            return Err(SubtiError::ParseBinaryError);
        };
        self.idx = start + len;
        Ok(s)
    }

    /// Returns an error unless every byte of the record was consumed
    pub fn finish(self) -> SubtiResult<()> {
        if self.idx == self.data.len() {
            Ok(())
        } else {
            error!(
                "The length of the bytes blob did not match: {} vs {}",
                self.data.len(),
                self.idx
            );
            Err(SubtiError::ParseBinaryError)
        }
    }
}
