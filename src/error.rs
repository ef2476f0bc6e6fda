use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnowflakeError {
    #[error("Invalid node ID: {node}. Must be between 0 and {max}")]
    InvalidNode { node: u64, max: u64 },

    #[error(
        "Invalid layout: {total} bits requested, at most {max} fit in a non-negative i64",
        max = crate::defs::MAX_LAYOUT_BITS
    )]
    InvalidLayout { total: u32 },

    /// The configured timestamp field can no longer represent the current
    /// time. Retrying does not help; a new epoch is required.
    #[error("Timestamp offset {offset} exceeds maximum {max}")]
    ClockRangeExhausted { offset: i64, max: i64 },

    #[error("Clock reads {now} which is before the epoch {epoch}")]
    ClockBeforeEpoch { now: i64, epoch: i64 },

    #[error("ID generator mutex was poisoned by a panicking thread")]
    GeneratorPoisoned,

    #[error("Invalid snowflake ID: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SnowflakeError::InvalidNode { node: 128, max: 127 };
        assert_eq!(
            err.to_string(),
            "Invalid node ID: 128. Must be between 0 and 127"
        );

        let err = SnowflakeError::InvalidLayout { total: 64 };
        assert_eq!(
            err.to_string(),
            format!(
                "Invalid layout: 64 bits requested, at most {} fit in a non-negative i64",
                crate::defs::MAX_LAYOUT_BITS
            )
        );

        let err = SnowflakeError::InvalidId("Failed to parse".to_string());
        assert_eq!(err.to_string(), "Invalid snowflake ID: Failed to parse");
    }
}
