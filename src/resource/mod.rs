//! The registry collaborator: search roots, content types, processor chains.

pub mod content_type;
pub mod file;
pub mod registry;

pub use content_type::{ContentType, MimeTypes};
pub use file::{FileRegistry, FileRegistryBuilder};
pub use registry::{AssetAttributes, Candidates, Registry};
