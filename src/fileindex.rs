//! Recursive directory indexer and `Gameexe`-driven scan roots
//! (spec.md §4.8).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, RlvmError};
use crate::gameexe::Gameexe;

/// One indexed file: its (lowercased) extension and full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub ext: String,
    pub path: PathBuf,
}

/// `stem → [ (ext, path) ]` multimap built by [`index`].
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    entries: HashMap<String, Vec<IndexedFile>>,
}

fn lowercase_stem_and_ext(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?.to_lowercase();
    let ext = path.extension()?.to_str()?.to_lowercase();
    Some((stem, ext))
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, stem: String, ext: String, path: PathBuf) {
        self.entries.entry(stem).or_default().push(IndexedFile { ext, path });
    }

    /// `find(name, ext_filter?)`: truncates `name` at the first `'?'`,
    /// lowercases it, and returns the first entry whose extension passes
    /// `ext_filter` (or the first entry at all, if no filter is given).
    pub fn find(&self, name: &str, ext_filter: Option<&[&str]>) -> Result<&Path> {
        let truncated = name.split('?').next().unwrap_or(name).to_lowercase();
        let candidates = self
            .entries
            .get(&truncated)
            .ok_or_else(|| RlvmError::NotFound(name.to_string()))?;
        candidates
            .iter()
            .find(|c| ext_filter.is_none_or(|exts| exts.iter().any(|e| e.eq_ignore_ascii_case(&c.ext))))
            .map(|c| c.path.as_path())
            .ok_or_else(|| RlvmError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recursively walks `root`, lowercasing extension and stem, inserting
/// `(stem → (ext, path))` into a multimap. `ext_filter`, if given,
/// restricts which extensions are indexed at all.
pub fn index(root: &Path, ext_filter: Option<&[&str]>) -> Result<FileIndex> {
    let mut out = FileIndex::new();
    walk(root, ext_filter, &mut out)?;
    Ok(out)
}

fn walk(dir: &Path, ext_filter: Option<&[&str]>, out: &mut FileIndex) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| RlvmError::NotFound(format!("{}: {e}", dir.display())))?;
    for entry in entries {
        let entry = entry.map_err(|e| RlvmError::NotFound(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, ext_filter, out)?;
            continue;
        }
        if let Some((stem, ext)) = lowercase_stem_and_ext(&path) {
            if ext_filter.is_none_or(|exts| exts.iter().any(|e| e.eq_ignore_ascii_case(&ext))) {
                out.insert(stem, ext, path);
            }
        }
    }
    Ok(())
}

/// The extensions `find`'s default scan recognises.
pub const KNOWN_EXTENSIONS: [&str; 4] = ["nwa", "ovk", "g00", "anm"];

/// Reads a `FOLDNAME` list of accepted directory names and `__GAMEPATH`
/// from `cfg`, then indexes every direct subdirectory of `__GAMEPATH`
/// whose lowercased name is in the list, filtering to
/// [`KNOWN_EXTENSIONS`].
pub fn build_from_gameexe(cfg: &Gameexe) -> Result<FileIndex> {
    let gamepath = cfg
        .ini("__GAMEPATH")
        .as_string()
        .ok_or_else(|| RlvmError::NotFound("__GAMEPATH".into()))?;
    let base = PathBuf::from(gamepath);

    let accepted: Vec<String> = cfg
        .prefix_iter("FOLDNAME")
        .flat_map(|(_, values)| values.iter().filter_map(|v| v.as_string_token()))
        .map(|s| s.to_lowercase())
        .collect();

    let mut out = FileIndex::new();
    let entries = std::fs::read_dir(&base).map_err(|e| RlvmError::NotFound(format!("{}: {e}", base.display())))?;
    for entry in entries {
        let entry = entry.map_err(|e| RlvmError::NotFound(e.to_string()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        if accepted.iter().any(|a| a == &name.to_lowercase()) {
            walk(&path, Some(&KNOWN_EXTENSIONS), &mut out)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_truncates_at_question_mark_and_lowercases() {
        let mut idx = FileIndex::new();
        idx.insert("haikei01".into(), "g00".into(), PathBuf::from("/bg/haikei01.g00"));
        let found = idx.find("HAIKEI01?000", None).unwrap();
        assert_eq!(found, Path::new("/bg/haikei01.g00"));
    }

    #[test]
    fn find_respects_extension_filter() {
        let mut idx = FileIndex::new();
        idx.insert("bgm01".into(), "wav".into(), PathBuf::from("/snd/bgm01.wav"));
        idx.insert("bgm01".into(), "nwa".into(), PathBuf::from("/snd/bgm01.nwa"));
        let found = idx.find("bgm01", Some(&["nwa"])).unwrap();
        assert_eq!(found, Path::new("/snd/bgm01.nwa"));
    }

    #[test]
    fn find_missing_name_errors() {
        let idx = FileIndex::new();
        assert!(matches!(idx.find("missing", None), Err(RlvmError::NotFound(_))));
    }

    #[test]
    fn find_missing_extension_errors() {
        let mut idx = FileIndex::new();
        idx.insert("a".into(), "wav".into(), PathBuf::from("/a.wav"));
        assert!(matches!(idx.find("a", Some(&["nwa"])), Err(RlvmError::NotFound(_))));
    }
}
