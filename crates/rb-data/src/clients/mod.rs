//! Row client implementations

pub mod memory;

pub use memory::MemoryClient;
