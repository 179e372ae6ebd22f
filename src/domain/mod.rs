// Accounts and profiles
pub mod account;

// Instruments and feed payloads
pub mod market;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Core trading domain
pub mod trading;

// Domain-specific error types
pub mod errors;
