//! RealLive archive: table of contents, `SEEN####.TXT` overrides, and
//! lazy per-scene decode (spec.md §4.5, §6).

use std::collections::HashMap;

use crate::archive::reallive::header::Header;
use crate::archive::reallive::parser::parse_bytecode;
use crate::archive::reallive::xorkey::{apply_first_level, apply_second_level, TitleKeyResolver};
use crate::consts::{RL_ARCHIVE_MAX_SCENES, RL_HEADER_COMPRESSED_OFFSET, RL_HEADER_COMPRESSED_SIZE, RL_HEADER_SIZE};
use crate::error::{Result, RlvmError};
use crate::instruction::Instruction;
use crate::lzss::decompress_lzss;
use crate::reader::ByteReader;
use crate::scene::Scene;

/// One table-of-contents entry: `(offset, length)` into the archive's
/// backing bytes. A zero offset means "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TocEntry {
    offset: u32,
    length: u32,
}

/// A parsed scene, ready for execution: the raw `Scene` record plus its
/// parsed bytecode stream keyed by byte offset.
#[derive(Debug, Clone)]
pub struct ParsedScene {
    pub scene: Scene,
    pub elements: std::collections::BTreeMap<u32, Instruction>,
}

/// A RealLive script archive backed by an in-memory byte buffer.
///
/// Scenes are parsed lazily on first access and then cached.
pub struct Archive {
    bytes: Vec<u8>,
    toc: HashMap<i32, TocEntry>,
    overrides: HashMap<i32, Vec<u8>>,
    regname: String,
    key_resolver: TitleKeyResolver,
    cache: std::cell::RefCell<HashMap<i32, std::rc::Rc<ParsedScene>>>,
}

impl Archive {
    /// Read the table of contents from the head of `bytes` (no override
    /// pass; use [`Self::with_overrides`] to apply `SEEN####.TXT` files).
    pub fn new(bytes: Vec<u8>, regname: impl Into<String>, key_resolver: TitleKeyResolver) -> Result<Self> {
        let regname = regname.into();
        let toc = read_toc(&bytes)?;
        tracing::info!(regname, scene_count = toc.len(), archive_len = bytes.len(), "loaded reallive archive");
        Ok(Self {
            bytes,
            toc,
            overrides: HashMap::new(),
            regname,
            key_resolver,
            cache: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Replace the table-of-contents entry for `index` with a standalone
    /// scene payload (the override pass described in spec.md §4.5).
    pub fn add_override(&mut self, index: i32, payload: Vec<u8>) {
        self.overrides.insert(index, payload);
        self.cache.borrow_mut().remove(&index);
    }

    /// First scenario id present in the table of contents.
    pub fn first_scenario_id(&self) -> Option<i32> {
        self.toc.keys().copied().min()
    }

    /// Fetch (and cache) the parsed scene for `index`, or `None` if no
    /// TOC entry and no override exists for it.
    pub fn get_scenario(&self, index: i32) -> Result<Option<std::rc::Rc<ParsedScene>>> {
        if let Some(cached) = self.cache.borrow().get(&index) {
            return Ok(Some(cached.clone()));
        }
        let payload: &[u8] = if let Some(bytes) = self.overrides.get(&index) {
            bytes.as_slice()
        } else if let Some(entry) = self.toc.get(&index) {
            let begin = entry.offset as usize;
            let end = begin + entry.length as usize;
            self.bytes
                .get(begin..end)
                .ok_or_else(|| RlvmError::InvalidArchive(format!("scene {index} out of bounds")))?
        } else {
            return Ok(None);
        };
        let parsed = parse_scenario(payload, index, &self.regname, self.key_resolver)?;
        let rc = std::rc::Rc::new(parsed);
        self.cache.borrow_mut().insert(index, rc.clone());
        Ok(Some(rc))
    }
}

fn read_toc(bytes: &[u8]) -> Result<HashMap<i32, TocEntry>> {
    let toc_bytes = crate::consts::RL_TOC_SIZE;
    if bytes.len() < toc_bytes {
        return Err(RlvmError::InvalidArchive(format!(
            "archive shorter than the {toc_bytes}-byte table of contents"
        )));
    }
    let mut r = ByteReader::new(&bytes[..toc_bytes]);
    let mut toc = HashMap::new();
    for i in 0..RL_ARCHIVE_MAX_SCENES {
        let offset = r.pop_u32();
        let length = r.pop_u32();
        if offset != 0 {
            toc.insert(i as i32, TocEntry { offset, length });
        }
    }
    Ok(toc)
}

#[tracing::instrument(skip(payload, key_resolver), fields(scene = id))]
fn parse_scenario(
    payload: &[u8],
    id: i32,
    regname: &str,
    key_resolver: TitleKeyResolver,
) -> Result<ParsedScene> {
    tracing::debug!("parsing scene");
    let header = Header::parse(payload)?;

    let compressed_offset = i32::from_le_bytes(
        payload[RL_HEADER_COMPRESSED_OFFSET..RL_HEADER_COMPRESSED_OFFSET + 4]
            .try_into()
            .unwrap(),
    ) as usize;
    let compressed_size = i32::from_le_bytes(
        payload[RL_HEADER_COMPRESSED_SIZE..RL_HEADER_COMPRESSED_SIZE + 4]
            .try_into()
            .unwrap(),
    ) as usize;
    let _ = RL_HEADER_SIZE;
    let mut compressed = payload
        .get(compressed_offset..compressed_offset + compressed_size)
        .ok_or_else(|| RlvmError::InvalidArchive("compressed region out of bounds".into()))?
        .to_vec();
    apply_first_level(&mut compressed);

    let mut decompressed = decompress_lzss(&compressed)?;

    if header.use_second_level_xor {
        let key = key_resolver(regname).ok_or(RlvmError::UnknownKey)?;
        apply_second_level(&mut decompressed, key);
    }

    let (elements, entrypoints) = parse_bytecode(&decompressed);

    let mut scene = Scene::empty(id, format!("SEEN{id:04}"));
    scene.bytecode = decompressed;
    scene.entrypoints = entrypoints;

    Ok(ParsedScene { scene, elements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reallive::xorkey::no_known_titles;

    fn toc_only_archive() -> Vec<u8> {
        vec![0u8; crate::consts::RL_TOC_SIZE]
    }

    #[test]
    fn empty_toc_has_no_scenarios() {
        let archive = Archive::new(toc_only_archive(), "", no_known_titles).unwrap();
        assert_eq!(archive.first_scenario_id(), None);
        assert!(archive.get_scenario(0).unwrap().is_none());
    }

    #[test]
    fn too_short_archive_is_invalid() {
        assert!(matches!(
            Archive::new(vec![0u8; 10], "", no_known_titles),
            Err(RlvmError::InvalidArchive(_))
        ));
    }
}
