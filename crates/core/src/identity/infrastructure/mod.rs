pub mod average_hasher;
pub mod gallery_manifest;
