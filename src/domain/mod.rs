pub mod dialect;
pub mod entities;
pub mod errors;
pub mod naming;
