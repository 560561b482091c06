pub mod extraction_port;
pub mod file_port;
pub mod metadata_port;
