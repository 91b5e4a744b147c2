// Serde interchange types for units.

pub mod dto;
