//! RealLive scene header: `0x1D0` bytes, compiler magic, debug
//! entrypoints, savepoint flags, dramatis personae, optional metadata
//! block (spec.md §4.5, §6).

use crate::consts::{RL_HEADER_SIZE, RL_SECOND_XOR_THRESHOLD, RL_SUPPORTED_COMPILERS};
use crate::error::{Result, RlvmError};
use crate::reader::ByteReader;

/// Optional RLdev-authored metadata block trailing the dramatis personae.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub text_encoding: u8,
}

/// Parsed RealLive scene header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub compiler_version: i32,
    pub use_second_level_xor: bool,
    pub debug_entrypoint_minus_one: i32,
    pub debug_entrypoint_minus_two: i32,
    pub savepoint_message: i32,
    pub savepoint_selcom: i32,
    pub savepoint_seentop: i32,
    pub dramatis_personae: Vec<String>,
    pub metadata: Option<Metadata>,
}

fn read_i32_at(data: &[u8], offset: usize) -> Result<i32> {
    data.get(offset..offset + 4)
        .map(|s| i32::from_le_bytes(s.try_into().unwrap()))
        .ok_or_else(|| RlvmError::InvalidArchive(format!("header truncated at offset {offset}")))
}

impl Header {
    /// Parse a header from the start of a scene payload.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < RL_HEADER_SIZE {
            return Err(RlvmError::InvalidArchive(format!(
                "scene header needs {RL_HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }
        if read_i32_at(data, 0)? != RL_HEADER_SIZE as i32 {
            return Err(RlvmError::InvalidArchive("unsupported bytecode version".into()));
        }
        let compiler_version = read_i32_at(data, 4)?;
        if !RL_SUPPORTED_COMPILERS.contains(&compiler_version) {
            return Err(RlvmError::InvalidCompiler(compiler_version));
        }
        let use_second_level_xor = compiler_version >= RL_SECOND_XOR_THRESHOLD;

        let debug_entrypoint_minus_one = read_i32_at(data, 0x2c)?;
        let debug_entrypoint_minus_two = read_i32_at(data, 0x30)?;
        let savepoint_message = read_i32_at(data, 0x1c4)?;
        let savepoint_selcom = read_i32_at(data, 0x1c8)?;
        let savepoint_seentop = read_i32_at(data, 0x1cc)?;

        let dp_count = read_i32_at(data, 0x18)?.max(0) as usize;
        let mut offs = read_i32_at(data, 0x14)?.max(0) as usize;
        let mut dramatis_personae = Vec::with_capacity(dp_count);
        for _ in 0..dp_count {
            let elen = read_i32_at(data, offs)?.max(0) as usize;
            let name_start = offs + 4;
            let name_end = (name_start + elen.saturating_sub(1)).min(data.len());
            let name = String::from_utf8_lossy(&data[name_start.min(data.len())..name_end]).into_owned();
            dramatis_personae.push(name);
            offs += elen + 4;
        }

        let metadata_offs = (read_i32_at(data, 0x14)? + read_i32_at(data, 0x1c)?).max(0) as usize;
        let metadata = if metadata_offs != read_i32_at(data, 0x20)? as usize {
            parse_metadata(data, metadata_offs)
        } else {
            None
        };

        Ok(Self {
            compiler_version,
            use_second_level_xor,
            debug_entrypoint_minus_one,
            debug_entrypoint_minus_two,
            savepoint_message,
            savepoint_selcom,
            savepoint_seentop,
            dramatis_personae,
            metadata,
        })
    }
}

fn parse_metadata(data: &[u8], offs: usize) -> Option<Metadata> {
    if offs + 21 > data.len() {
        return None;
    }
    let mut r = ByteReader::new(&data[offs..]);
    let meta_len = r.pop_u32() as usize;
    let id_len = r.pop_u32() as usize + 1;
    if meta_len < id_len + 17 {
        return None;
    }
    let encoding = *data.get(offs + id_len + 16)?;
    Some(Metadata { text_encoding: encoding })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_header(compiler_version: i32) -> Vec<u8> {
        let mut data = vec![0u8; RL_HEADER_SIZE];
        data[0..4].copy_from_slice(&(RL_HEADER_SIZE as i32).to_le_bytes());
        data[4..8].copy_from_slice(&compiler_version.to_le_bytes());
        // dramatis_personae count = 0, and its start offset must not
        // collide with the metadata-probe bytes at 0x20.
        data[0x14..0x18].copy_from_slice(&0i32.to_le_bytes());
        data[0x18..0x1c].copy_from_slice(&0i32.to_le_bytes());
        data
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = blank_header(10002);
        data[0..4].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(Header::parse(&data), Err(RlvmError::InvalidArchive(_))));
    }

    #[test]
    fn rejects_unsupported_compiler() {
        let data = blank_header(42);
        assert!(matches!(Header::parse(&data), Err(RlvmError::InvalidCompiler(42))));
    }

    #[test]
    fn second_level_xor_flag_follows_version() {
        assert!(!Header::parse(&blank_header(10002)).unwrap().use_second_level_xor);
        assert!(Header::parse(&blank_header(110002)).unwrap().use_second_level_xor);
        assert!(Header::parse(&blank_header(1110002)).unwrap().use_second_level_xor);
    }
}
