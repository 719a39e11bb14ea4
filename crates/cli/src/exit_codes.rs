//! CLI Exit Code Registry
//!
//! Single source of truth for `palika` exit codes. Scripts that drive the
//! pipeline rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Success                                                     |
//! | 1    | General error (unspecified)                                 |
//! | 2    | Usage error (bad arguments, invalid config)                 |
//! | 3    | Missing input (neither the store nor its source workbook)   |
//! | 4    | Malformed source (unreadable workbook, no header, bad map)  |
//! | 5    | Runtime failure (store, CSV or report write)                |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or a config that fails validation.
pub const EXIT_USAGE: u8 = 2;

/// A required input is absent: no derived store and no source workbook,
/// or no reference map.
pub const EXIT_MISSING_INPUT: u8 = 3;

/// A source exists but cannot be interpreted.
pub const EXIT_MALFORMED_SOURCE: u8 = 4;

/// Failure while writing or reading a store or an output file.
pub const EXIT_RUNTIME: u8 = 5;
