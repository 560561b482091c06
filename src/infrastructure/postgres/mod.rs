pub mod connection_manager;
pub mod postgres_adapter;
