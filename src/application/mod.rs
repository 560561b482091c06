pub mod orchestrator;
pub mod runtime;
