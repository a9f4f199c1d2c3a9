//! Raw property codes as reported by the container format.

/// Dataset storage layout codes.
pub mod layout {
    pub const COMPACT: i32 = 0;
    pub const CONTIGUOUS: i32 = 1;
    pub const CHUNKED: i32 = 2;
    pub const VIRTUAL: i32 = 3;
}

/// Predefined filter identifiers. Ids 256 and above are registered
/// third-party filters.
pub mod filter {
    pub const DEFLATE: i32 = 1;
    pub const SHUFFLE: i32 = 2;
    pub const FLETCHER32: i32 = 3;
    pub const SZIP: i32 = 4;
    pub const NBIT: i32 = 5;
    pub const SCALEOFFSET: i32 = 6;
}

/// Space allocation time codes. `DEFAULT` defers to the layout.
pub mod alloc_time {
    pub const DEFAULT: i32 = 0;
    pub const EARLY: i32 = 1;
    pub const LATE: i32 = 2;
    pub const INCR: i32 = 3;
}

/// Fill time codes.
pub mod fill_time {
    pub const ALLOC: i32 = 0;
    pub const NEVER: i32 = 1;
    pub const IFSET: i32 = 2;
}

/// Fill value status codes.
pub mod fill_value {
    pub const UNDEFINED: i32 = 0;
    pub const DEFAULT: i32 = 1;
    pub const USER_DEFINED: i32 = 2;
}
