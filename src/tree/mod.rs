//! Directory tree digests
//!
//! A tree digest identifies the content of a directory: the bytes of its
//! files and the targets of its symlinks, visited in a fixed order. It does
//! not depend on where the tree lives or on file metadata.

pub mod cancel;
pub mod digest;
pub mod digester;
pub mod walker;

pub use cancel::CancelToken;
pub use digest::{Algorithm, Digest};
pub use digester::{hash_folder, FileDigest, TreeDigester};
