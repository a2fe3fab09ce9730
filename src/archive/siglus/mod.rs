//! Siglus archive, pack header, scene header/table parser, and
//! decryption keys (spec.md §4.5, §6).

pub mod archive;
pub mod header;
pub mod scene;
pub mod xorkey;

pub use archive::Archive;
pub use header::PackHeader;
pub use xorkey::{XorKey, EASY_KEY, EMPTY_KEY};
