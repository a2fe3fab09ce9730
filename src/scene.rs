//! The raw, archive-level scene record (spec.md §3 "Scene"). Parsing a
//! scene's `bytecode` blob into an ordered instruction stream is the
//! job of the dialect-specific parsers under `archive::reallive` and
//! `archive::siglus`.

use std::collections::HashMap;

/// One loaded scenario ("SEEN") unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: i32,
    pub name: String,
    pub bytecode: Vec<u8>,
    pub strings: Vec<String>,
    pub labels: Vec<u32>,
    pub z_labels: Vec<u32>,
    pub cmd_labels: Vec<u32>,
    pub properties: Vec<i32>,
    pub commands: Vec<i32>,
    pub call_property_names: Vec<String>,
    pub name_refs: Vec<i32>,
    pub kidoku_lines: Vec<u32>,
    pub entrypoints: HashMap<i32, u32>,
}

impl Scene {
    /// Construct an empty scene with no bytecode and no tables,
    /// identified only by `id`/`name`. Useful as a parser's build target
    /// before tables are filled in.
    pub fn empty(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bytecode: Vec::new(),
            strings: Vec::new(),
            labels: Vec::new(),
            z_labels: Vec::new(),
            cmd_labels: Vec::new(),
            properties: Vec::new(),
            commands: Vec::new(),
            call_property_names: Vec::new(),
            name_refs: Vec::new(),
            kidoku_lines: Vec::new(),
            entrypoints: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_has_no_entrypoints() {
        let scene = Scene::empty(12, "SEEN0012");
        assert!(scene.entrypoints.is_empty());
        assert_eq!(scene.name, "SEEN0012");
    }
}
