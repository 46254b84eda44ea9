pub mod config;
pub mod isa;
pub mod memory;
pub mod processor;
