//! Minimal class-file header reader.
//!
//! Only the fixed-size prefix is inspected: magic, minor/major version and
//! the constant pool count. Nothing past that is parsed.

use crate::error::TransformError;

pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;
pub const HEADER_LEN: usize = 10;
/// JDK 1.0.2.
pub const MIN_MAJOR_VERSION: u16 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool_count: u16,
}

pub fn parse_header(bytes: &[u8]) -> Result<ClassHeader, TransformError> {
    if bytes.len() < HEADER_LEN {
        return Err(TransformError::Truncated {
            len: bytes.len(),
            needed: HEADER_LEN,
        });
    }

    let magic = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != CLASS_MAGIC {
        return Err(TransformError::BadMagic { found: magic });
    }

    let minor_version = u16::from_be_bytes([bytes[4], bytes[5]]);
    let major_version = u16::from_be_bytes([bytes[6], bytes[7]]);
    if major_version < MIN_MAJOR_VERSION {
        return Err(TransformError::UnsupportedVersion {
            major: major_version,
            minor: minor_version,
        });
    }

    Ok(ClassHeader {
        minor_version,
        major_version,
        constant_pool_count: u16::from_be_bytes([bytes[8], bytes[9]]),
    })
}

#[cfg(test)]
pub(crate) fn fake_class(major: u16, body: &[u8]) -> Vec<u8> {
    let mut bytes = CLASS_MAGIC.to_be_bytes().to_vec();
    bytes.extend_from_slice(&0u16.to_be_bytes());
    bytes.extend_from_slice(&major.to_be_bytes());
    bytes.extend_from_slice(&1u16.to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}
