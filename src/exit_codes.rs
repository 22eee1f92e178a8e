//! Process exit codes of the wikilint binary.

/// No errors found
pub const SUCCESS: i32 = 0;

/// At least one page has errors (or needs manual review after fixing)
pub const VIOLATIONS_FOUND: i32 = 1;

/// Invalid configuration, unreadable input or other tool failure
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::{SUCCESS, TOOL_ERROR, VIOLATIONS_FOUND};

    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    pub fn violations_found() -> ! {
        std::process::exit(VIOLATIONS_FOUND);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
