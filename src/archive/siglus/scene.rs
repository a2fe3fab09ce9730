//! Per-scene Siglus header and table parser (spec.md §4.5).
//!
//! As with [`super::header`], the exact on-disk field order is not
//! recoverable from the original reader's field-access-only usage; this
//! parser fixes one consistent order and documents it here rather than
//! guessing at byte offsets.

use crate::consts::SIGLUS_STRING_XOR_MULTIPLIER;
use crate::error::{Result, RlvmError};
use crate::reader::ByteReader;
use crate::scene::Scene;

const SCENE_HEADER_FIELD_COUNT: usize = 28;
const SCENE_HEADER_SIZE: usize = SCENE_HEADER_FIELD_COUNT * 4;

struct SceneHeader {
    scene_offset: i32,
    scene_size: i32,
    str_idxlist_offset: i32,
    str_idxlist_size: i32,
    str_list_offset: i32,
    label_list_offset: i32,
    label_cnt: i32,
    zlabel_list_offset: i32,
    zlabel_cnt: i32,
    cmdlabel_list_offset: i32,
    cmdlabel_cnt: i32,
    prop_offset: i32,
    prop_cnt: i32,
    prop_name_offset: i32,
    prop_nameidx_offset: i32,
    prop_nameidx_cnt: i32,
    cmdlist_offset: i32,
    cmd_cnt: i32,
    cmd_name_offset: i32,
    cmd_nameidx_offset: i32,
    cmd_nameidx_cnt: i32,
    call_nameidx_offset: i32,
    call_nameidx_cnt: i32,
    call_name_offset: i32,
    namae_offset: i32,
    namae_cnt: i32,
    kidoku_offset: i32,
    kidoku_cnt: i32,
}

impl SceneHeader {
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SCENE_HEADER_SIZE {
            return Err(RlvmError::InvalidArchive(format!(
                "Siglus scene header needs {SCENE_HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }
        let mut r = ByteReader::new(&data[..SCENE_HEADER_SIZE]);
        Ok(Self {
            scene_offset: r.pop_i32(),
            scene_size: r.pop_i32(),
            str_idxlist_offset: r.pop_i32(),
            str_idxlist_size: r.pop_i32(),
            str_list_offset: r.pop_i32(),
            label_list_offset: r.pop_i32(),
            label_cnt: r.pop_i32(),
            zlabel_list_offset: r.pop_i32(),
            zlabel_cnt: r.pop_i32(),
            cmdlabel_list_offset: r.pop_i32(),
            cmdlabel_cnt: r.pop_i32(),
            prop_offset: r.pop_i32(),
            prop_cnt: r.pop_i32(),
            prop_name_offset: r.pop_i32(),
            prop_nameidx_offset: r.pop_i32(),
            prop_nameidx_cnt: r.pop_i32(),
            cmdlist_offset: r.pop_i32(),
            cmd_cnt: r.pop_i32(),
            cmd_name_offset: r.pop_i32(),
            cmd_nameidx_offset: r.pop_i32(),
            cmd_nameidx_cnt: r.pop_i32(),
            call_nameidx_offset: r.pop_i32(),
            call_nameidx_cnt: r.pop_i32(),
            call_name_offset: r.pop_i32(),
            namae_offset: r.pop_i32(),
            namae_cnt: r.pop_i32(),
            kidoku_offset: r.pop_i32(),
            kidoku_cnt: r.pop_i32(),
        })
    }
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn slice_at<'a>(data: &'a [u8], offset: i32, len: usize) -> Result<&'a [u8]> {
    let offset = offset.max(0) as usize;
    data.get(offset..offset + len)
        .ok_or_else(|| RlvmError::InvalidArchive(format!("Siglus table out of bounds at {offset}")))
}

fn read_name_table(data: &[u8], idx_offset: i32, idx_cnt: i32, name_offset: i32) -> Result<Vec<String>> {
    let idx_bytes = slice_at(data, idx_offset, 8 * idx_cnt.max(0) as usize)?;
    let name_base = name_offset.max(0) as usize;
    let names = data.get(name_base..).unwrap_or(&[]);
    let mut r = ByteReader::new(idx_bytes);
    let mut out = Vec::with_capacity(idx_cnt.max(0) as usize);
    for _ in 0..idx_cnt.max(0) {
        let offset = r.pop_u32() as usize;
        let size = r.pop_u32() as usize;
        let bytes = names.get(offset..offset + size).unwrap_or(&[]);
        out.push(decode_utf16le(bytes));
    }
    Ok(out)
}

/// Parse a single scene's table of contents into a [`Scene`].
pub fn parse_scene(data: &[u8], id: i32, name: impl Into<String>) -> Result<Scene> {
    let hdr = SceneHeader::parse(data)?;

    let bytecode = slice_at(data, hdr.scene_offset, hdr.scene_size.max(0) as usize)?.to_vec();

    let strings = {
        let idx_bytes = slice_at(data, hdr.str_idxlist_offset, 8 * hdr.str_idxlist_size.max(0) as usize)?;
        let name_base = hdr.str_list_offset.max(0) as usize;
        let name_bytes = data.get(name_base..).unwrap_or(&[]);
        let mut r = ByteReader::new(idx_bytes);
        let mut out = Vec::with_capacity(hdr.str_idxlist_size.max(0) as usize);
        for i in 0..hdr.str_idxlist_size.max(0) {
            let offset = r.pop_u32() as usize * 2;
            let size = r.pop_u32() as usize * 2;
            let raw = name_bytes.get(offset..offset + size).unwrap_or(&[]);
            let mut units: Vec<u16> = raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            let xor = (SIGLUS_STRING_XOR_MULTIPLIER.wrapping_mul(i as u32)) as u16;
            for u in &mut units {
                *u ^= xor;
            }
            out.push(String::from_utf16_lossy(&units));
        }
        out
    };

    let labels = read_u32_table(data, hdr.label_list_offset, hdr.label_cnt)?;
    let z_labels = read_u32_table(data, hdr.zlabel_list_offset, hdr.zlabel_cnt)?;

    let cmd_labels = {
        let bytes = slice_at(data, hdr.cmdlabel_list_offset, 8 * hdr.cmdlabel_cnt.max(0) as usize)?;
        let mut r = ByteReader::new(bytes);
        let mut out = Vec::with_capacity(2 * hdr.cmdlabel_cnt.max(0) as usize);
        for _ in 0..hdr.cmdlabel_cnt.max(0) {
            out.push(r.pop_u32());
            out.push(r.pop_u32());
        }
        out
    };

    let properties = {
        let bytes = slice_at(data, hdr.prop_offset, 8 * hdr.prop_cnt.max(0) as usize)?;
        let mut r = ByteReader::new(bytes);
        let mut out = Vec::with_capacity(2 * hdr.prop_cnt.max(0) as usize);
        for _ in 0..hdr.prop_cnt.max(0) {
            out.push(r.pop_i32());
            out.push(r.pop_i32());
        }
        out
    };
    let _property_names = read_name_table(data, hdr.prop_nameidx_offset, hdr.prop_nameidx_cnt, hdr.prop_name_offset)?;

    let commands = {
        let bytes = slice_at(data, hdr.cmdlist_offset, 4 * hdr.cmd_cnt.max(0) as usize)?;
        let mut r = ByteReader::new(bytes);
        (0..hdr.cmd_cnt.max(0)).map(|_| r.pop_i32()).collect()
    };
    let _command_names = read_name_table(data, hdr.cmd_nameidx_offset, hdr.cmd_nameidx_cnt, hdr.cmd_name_offset)?;

    let call_property_names =
        read_name_table(data, hdr.call_nameidx_offset, hdr.call_nameidx_cnt, hdr.call_name_offset)?;

    let name_refs = {
        let bytes = slice_at(data, hdr.namae_offset, 4 * hdr.namae_cnt.max(0) as usize)?;
        let mut r = ByteReader::new(bytes);
        (0..hdr.namae_cnt.max(0)).map(|_| r.pop_i32()).collect()
    };

    let kidoku_lines = {
        let bytes = slice_at(data, hdr.kidoku_offset, 4 * hdr.kidoku_cnt.max(0) as usize)?;
        let mut r = ByteReader::new(bytes);
        (0..hdr.kidoku_cnt.max(0)).map(|_| r.pop_u32()).collect()
    };

    Ok(Scene {
        id,
        name: name.into(),
        bytecode,
        strings,
        labels,
        z_labels,
        cmd_labels,
        properties,
        commands,
        call_property_names,
        name_refs,
        kidoku_lines,
        entrypoints: std::collections::HashMap::new(),
    })
}

fn read_u32_table(data: &[u8], offset: i32, count: i32) -> Result<Vec<u32>> {
    let bytes = slice_at(data, offset, 4 * count.max(0) as usize)?;
    let mut r = ByteReader::new(bytes);
    Ok((0..count.max(0)).map(|_| r.pop_u32()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_header() {
        assert!(matches!(parse_scene(&[0u8; 4], 0, "x"), Err(RlvmError::InvalidArchive(_))));
    }

    #[test]
    fn empty_tables_parse_to_empty_scene() {
        let data = vec![0u8; SCENE_HEADER_SIZE];
        let scene = parse_scene(&data, 3, "SEEN0003").unwrap();
        assert_eq!(scene.id, 3);
        assert!(scene.bytecode.is_empty());
        assert!(scene.labels.is_empty());
    }
}
