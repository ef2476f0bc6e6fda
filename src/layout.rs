use crate::defs::{DEFAULT_NODE_BITS, DEFAULT_SEQUENCE_BITS, DEFAULT_TIMESTAMP_BITS, MAX_LAYOUT_BITS};
use crate::error::SnowflakeError;
use crate::SnowflakeId;

/// Bit widths of the three fields packed into an id, most significant first:
/// timestamp offset, node, sequence. The sign bit is always left clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    timestamp_bits: u8,
    node_bits: u8,
    sequence_bits: u8,
}

/// The fields recovered from an id by [`Layout::decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parts {
    /// Milliseconds since the generator's epoch.
    pub timestamp: u64,
    pub node: u64,
    pub sequence: u64,
}

impl Layout {
    pub fn new(timestamp_bits: u8, node_bits: u8, sequence_bits: u8) -> Result<Self, SnowflakeError> {
        let total = u32::from(timestamp_bits) + u32::from(node_bits) + u32::from(sequence_bits);
        if total > u32::from(MAX_LAYOUT_BITS) {
            return Err(SnowflakeError::InvalidLayout { total });
        }

        Ok(Layout {
            timestamp_bits,
            node_bits,
            sequence_bits,
        })
    }

    pub fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    pub fn node_bits(&self) -> u8 {
        self.node_bits
    }

    pub fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    pub fn node_shift(&self) -> u8 {
        self.sequence_bits
    }

    pub fn timestamp_shift(&self) -> u8 {
        self.node_bits + self.sequence_bits
    }

    pub fn max_timestamp(&self) -> i64 {
        mask(self.timestamp_bits) as i64
    }

    pub fn max_node(&self) -> u64 {
        mask(self.node_bits)
    }

    pub fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Packs the three fields into an id. Callers keep each field within its
    /// bound; out-of-range bits are masked off rather than bleeding into a
    /// neighbouring field.
    pub fn compose(&self, timestamp: u64, node: u64, sequence: u64) -> SnowflakeId {
        debug_assert!(timestamp <= self.max_timestamp() as u64);
        debug_assert!(node <= self.max_node());
        debug_assert!(sequence <= self.max_sequence());

        let id = ((timestamp & mask(self.timestamp_bits)) << self.timestamp_shift())
            | ((node & self.max_node()) << self.node_shift())
            | (sequence & self.max_sequence());
        SnowflakeId::new_unchecked(id as i64)
    }

    pub fn decompose(&self, id: SnowflakeId) -> Parts {
        let raw = id.as_i64() as u64;
        Parts {
            timestamp: (raw >> self.timestamp_shift()) & mask(self.timestamp_bits),
            node: (raw >> self.node_shift()) & self.max_node(),
            sequence: raw & self.max_sequence(),
        }
    }

    /// True when `id` has no bits set outside the three fields.
    pub fn is_valid(&self, id: SnowflakeId) -> bool {
        let used = mask(self.timestamp_bits + self.timestamp_shift());
        (id.as_i64() as u64) & !used == 0
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            timestamp_bits: DEFAULT_TIMESTAMP_BITS,
            node_bits: DEFAULT_NODE_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
        }
    }
}

fn mask(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let layout = Layout::default();
        assert_eq!(layout.max_timestamp(), (1i64 << 44) - 1);
        assert_eq!(layout.max_node(), 127);
        assert_eq!(layout.max_sequence(), 4095);
        assert_eq!(layout.node_shift(), 12);
        assert_eq!(layout.timestamp_shift(), 19);
    }

    #[test]
    fn test_rejects_sign_bit() {
        assert_eq!(
            Layout::new(45, 7, 12),
            Err(SnowflakeError::InvalidLayout { total: 64 })
        );
        assert!(Layout::new(44, 7, 12).is_ok());
        assert!(Layout::new(41, 10, 12).is_ok());
    }

    #[test]
    fn test_zero_width_node() {
        let layout = Layout::new(51, 0, 12).unwrap();
        assert_eq!(layout.max_node(), 0);

        let id = layout.compose(77, 0, 3);
        let parts = layout.decompose(id);
        assert_eq!(parts.timestamp, 77);
        assert_eq!(parts.node, 0);
        assert_eq!(parts.sequence, 3);
    }

    #[test]
    fn test_compose_decompose() {
        let layout = Layout::default();
        let id = layout.compose(123_456_789, 42, 4095);

        assert_eq!(id.as_i64() >> 19, 123_456_789);
        assert_eq!((id.as_i64() >> 12) & 127, 42);
        assert_eq!(id.as_i64() & 4095, 4095);
        assert_eq!(
            layout.decompose(id),
            Parts {
                timestamp: 123_456_789,
                node: 42,
                sequence: 4095,
            }
        );
    }

    #[test]
    fn test_max_fields_stay_positive() {
        let layout = Layout::default();
        let id = layout.compose(
            layout.max_timestamp() as u64,
            layout.max_node(),
            layout.max_sequence(),
        );
        assert!(id.as_i64() > 0);
        assert_eq!(id.as_i64(), i64::MAX);
    }

    #[test]
    fn test_is_valid() {
        let layout = Layout::new(30, 5, 8).unwrap();
        assert!(layout.is_valid(layout.compose(1, 2, 3)));
        assert!(!layout.is_valid(SnowflakeId::new_unchecked(1i64 << 50)));
    }
}
