//! Filesystem-backed registry.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Candidate Enumeration                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  reference ──► resolve_search(reference, base_dir)          │
//! │                    │                                        │
//! │                    ├─► Absolute path: yielded if a file     │
//! │                    │                                        │
//! │                    ├─► "./x", "../x": base_dir only         │
//! │                    │                                        │
//! │                    └─► Logical "x": each root in order      │
//! │                        ├─► exact file                       │
//! │                        ├─► x.<registered ext>...            │
//! │                        └─► x/index.<registered ext>...      │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Directory listings are cached per registry; see [`EntryCache`].

mod cache;
mod path;
mod read;
mod registry;

pub use cache::EntryCache;
pub use path::{clean_path, is_relative_reference, normalize_path, split_extensions};
pub use read::{decode_utf8, read_text};
pub use registry::{FileRegistry, FileRegistryBuilder};
