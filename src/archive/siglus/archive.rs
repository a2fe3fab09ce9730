//! Siglus archive: outer pack header, per-scene lazy decode
//! (spec.md §4.5, §6).

use std::collections::HashMap;

use crate::archive::siglus::header::PackHeader;
use crate::archive::siglus::scene::parse_scene;
use crate::archive::siglus::xorkey::{apply_easy_key, apply_exekey, XorKey};
use crate::error::{Result, RlvmError};
use crate::reader::ByteReader;
use crate::scene::Scene;

/// A Siglus script archive backed by an in-memory byte buffer.
pub struct Archive {
    header: PackHeader,
    key: XorKey,
    scene_offsets: Vec<(u32, u32)>,
    scene_names: Vec<String>,
    bytes: Vec<u8>,
    cache: std::cell::RefCell<HashMap<i32, std::rc::Rc<Scene>>>,
}

impl Archive {
    pub fn new(bytes: Vec<u8>, key: XorKey) -> Result<Self> {
        let header = PackHeader::parse(&bytes)?;

        let idx_bytes = bytes
            .get(
                header.scn_data_index_list_ofs.max(0) as usize
                    ..header.scn_data_index_list_ofs.max(0) as usize + 8 * header.scn_data_index_cnt.max(0) as usize,
            )
            .ok_or_else(|| RlvmError::InvalidArchive("scene data index table out of bounds".into()))?;
        let mut r = ByteReader::new(idx_bytes);
        let mut scene_offsets = Vec::with_capacity(header.scn_data_cnt.max(0) as usize);
        for _ in 0..header.scn_data_cnt.max(0) {
            scene_offsets.push((r.pop_u32(), r.pop_u32()));
        }

        let name_idx_bytes = bytes
            .get(
                header.scn_name_index_list_ofs.max(0) as usize
                    ..header.scn_name_index_list_ofs.max(0) as usize + 8 * header.scn_name_index_cnt.max(0) as usize,
            )
            .ok_or_else(|| RlvmError::InvalidArchive("scene name index table out of bounds".into()))?;
        let mut nr = ByteReader::new(name_idx_bytes);
        let name_base = header.scn_name_list_ofs.max(0) as usize;
        let name_bytes = bytes.get(name_base..).unwrap_or(&[]);
        let mut scene_names = Vec::with_capacity(header.scn_name_cnt.max(0) as usize);
        for _ in 0..header.scn_name_cnt.max(0) {
            let offset = nr.pop_u32() as usize * 2;
            let size = nr.pop_u32() as usize * 2;
            let raw = name_bytes.get(offset..offset + size).unwrap_or(&[]);
            let units: Vec<u16> = raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            scene_names.push(String::from_utf16_lossy(&units));
        }

        tracing::info!(
            scene_count = scene_offsets.len(),
            scene_name_count = scene_names.len(),
            archive_len = bytes.len(),
            "loaded siglus archive"
        );
        Ok(Self { header, key, scene_offsets, scene_names, bytes, cache: std::cell::RefCell::new(HashMap::new()) })
    }

    pub fn scene_count(&self) -> usize {
        self.scene_offsets.len()
    }

    #[tracing::instrument(skip(self), fields(scene = id))]
    pub fn get_scene(&self, id: usize) -> Result<std::rc::Rc<Scene>> {
        if let Some(cached) = self.cache.borrow().get(&(id as i32)) {
            return Ok(cached.clone());
        }
        tracing::debug!("parsing scene");
        let (offset, size) = *self
            .scene_offsets
            .get(id)
            .ok_or_else(|| RlvmError::NotFound(format!("scene {id}")))?;
        let base = self.header.scn_data_list_ofs.max(0) as usize;
        let region = self
            .bytes
            .get(base + offset as usize..base + offset as usize + size as usize)
            .ok_or_else(|| RlvmError::InvalidArchive(format!("scene {id} payload out of bounds")))?;

        let mut payload = region.to_vec();
        if self.header.scn_data_exe_angou_mod != 0 {
            apply_exekey(&mut payload, &self.key);
        }
        apply_easy_key(&mut payload);
        let decompressed = crate::lzss::decompress_lzss(&payload)?;

        let name = self.scene_names.get(id).cloned().unwrap_or_default();
        let scene = parse_scene(&decompressed, id as i32, name)?;
        let rc = std::rc::Rc::new(scene);
        self.cache.borrow_mut().insert(id as i32, rc.clone());
        Ok(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_archive() {
        assert!(matches!(Archive::new(vec![0u8; 4], XorKey { exekey: [0; 16] }), Err(RlvmError::InvalidArchive(_))));
    }

    #[test]
    fn empty_header_has_no_scenes() {
        let bytes = vec![0u8; crate::archive::siglus::header::PACK_HEADER_SIZE];
        let archive = Archive::new(bytes, XorKey { exekey: [0; 16] }).unwrap();
        assert_eq!(archive.scene_count(), 0);
        assert!(matches!(archive.get_scene(0), Err(RlvmError::NotFound(_))));
    }
}
