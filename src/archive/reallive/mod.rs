//! RealLive archive, header, decryption, and bytecode parser
//! (spec.md §4.5, §6).

pub mod archive;
pub mod header;
pub mod parser;
pub mod xorkey;

pub use archive::{Archive, ParsedScene};
pub use header::Header;
pub use xorkey::{no_known_titles, TitleKey, TitleKeyResolver, XorRange};
