/// Timestamp width of the default layout, roughly 557 years of milliseconds.
pub const DEFAULT_TIMESTAMP_BITS: u8 = 44;

/// Node width of the default layout (128 nodes).
pub const DEFAULT_NODE_BITS: u8 = 7;

/// Sequence width of the default layout (4096 ids per millisecond).
pub const DEFAULT_SEQUENCE_BITS: u8 = 12;

/// 2006-01-02 15:04:05 UTC, in milliseconds since the Unix epoch.
pub const DEFAULT_EPOCH: i64 = 1136214245000;

/// The sign bit is never used, so ids stay non-negative.
pub const MAX_LAYOUT_BITS: u8 = 63;

/// Calendar format used when rendering the exhaustion instant.
pub const END_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
