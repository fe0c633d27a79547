//! Process exit codes. Part of the command-line contract.

pub const SUCCESS: i32 = 0;
pub const NO_VARIANTS: i32 = 1; // No manifest produced a variant, or a required input is missing
pub const INTERNAL_ERROR: i32 = 2; // Config error or unexpected failure
