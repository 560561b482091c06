pub mod local_storage;
pub mod mysql;
pub mod postgres;
