pub mod connection_manager;
pub mod mysql_adapter;
