//! Outer Siglus archive header (`Pack_hdr`): 23 `i32` fields locating the
//! four sub-tables (scene data, scene names, included properties,
//! included commands; spec.md §4.5, §6).
//!
//! Field order here is this core's own reconstruction from the fields
//! the original archive reader dereferences (`scn_data_cnt`,
//! `scn_data_exe_angou_mod`, ...); the exact on-disk byte order is not
//! recoverable from that usage alone, so two leading reserved fields and
//! one trailing reserved field pad the count to 23 and are otherwise
//! unused.

use crate::error::{Result, RlvmError};
use crate::reader::ByteReader;

pub const PACK_HEADER_FIELD_COUNT: usize = 23;
pub const PACK_HEADER_SIZE: usize = PACK_HEADER_FIELD_COUNT * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub scn_data_cnt: i32,
    pub scn_data_index_list_ofs: i32,
    pub scn_data_index_cnt: i32,
    pub scn_data_list_ofs: i32,
    pub scn_data_exe_angou_mod: i32,
    pub scn_name_list_ofs: i32,
    pub scn_name_index_list_ofs: i32,
    pub scn_name_index_cnt: i32,
    pub scn_name_cnt: i32,
    pub inc_prop_list_ofs: i32,
    pub inc_prop_cnt: i32,
    pub inc_prop_name_index_list_ofs: i32,
    pub inc_prop_name_cnt: i32,
    pub inc_prop_name_list_ofs: i32,
    pub inc_cmd_list_ofs: i32,
    pub inc_cmd_cnt: i32,
    pub inc_cmd_name_index_list_ofs: i32,
    pub inc_cmd_name_index_cnt: i32,
    pub inc_cmd_name_list_ofs: i32,
    pub inc_cmd_name_cnt: i32,
}

impl PackHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PACK_HEADER_SIZE {
            return Err(RlvmError::InvalidArchive(format!(
                "Siglus pack header needs {PACK_HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }
        let mut r = ByteReader::new(&data[..PACK_HEADER_SIZE]);
        let _reserved_0 = r.pop_i32();
        let _reserved_1 = r.pop_i32();
        let scn_data_cnt = r.pop_i32();
        let scn_data_index_list_ofs = r.pop_i32();
        let scn_data_index_cnt = r.pop_i32();
        let scn_data_list_ofs = r.pop_i32();
        let scn_data_exe_angou_mod = r.pop_i32();
        let scn_name_list_ofs = r.pop_i32();
        let scn_name_index_list_ofs = r.pop_i32();
        let scn_name_index_cnt = r.pop_i32();
        let scn_name_cnt = r.pop_i32();
        let inc_prop_list_ofs = r.pop_i32();
        let inc_prop_cnt = r.pop_i32();
        let inc_prop_name_index_list_ofs = r.pop_i32();
        let inc_prop_name_cnt = r.pop_i32();
        let inc_prop_name_list_ofs = r.pop_i32();
        let inc_cmd_list_ofs = r.pop_i32();
        let inc_cmd_cnt = r.pop_i32();
        let inc_cmd_name_index_list_ofs = r.pop_i32();
        let inc_cmd_name_index_cnt = r.pop_i32();
        let inc_cmd_name_list_ofs = r.pop_i32();
        let inc_cmd_name_cnt = r.pop_i32();
        let _reserved_2 = r.pop_i32();

        Ok(Self {
            scn_data_cnt,
            scn_data_index_list_ofs,
            scn_data_index_cnt,
            scn_data_list_ofs,
            scn_data_exe_angou_mod,
            scn_name_list_ofs,
            scn_name_index_list_ofs,
            scn_name_index_cnt,
            scn_name_cnt,
            inc_prop_list_ofs,
            inc_prop_cnt,
            inc_prop_name_index_list_ofs,
            inc_prop_name_cnt,
            inc_prop_name_list_ofs,
            inc_cmd_list_ofs,
            inc_cmd_cnt,
            inc_cmd_name_index_list_ofs,
            inc_cmd_name_index_cnt,
            inc_cmd_name_list_ofs,
            inc_cmd_name_cnt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_header() {
        assert!(matches!(PackHeader::parse(&[0u8; 10]), Err(RlvmError::InvalidArchive(_))));
    }

    #[test]
    fn parses_field_order() {
        let mut data = vec![0u8; PACK_HEADER_SIZE];
        // scn_data_cnt is the 3rd i32 field (index 2).
        data[8..12].copy_from_slice(&7i32.to_le_bytes());
        let hdr = PackHeader::parse(&data).unwrap();
        assert_eq!(hdr.scn_data_cnt, 7);
    }
}
