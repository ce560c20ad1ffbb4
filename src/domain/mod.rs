// Feature contract, corpus and model artifact
pub mod ml;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
