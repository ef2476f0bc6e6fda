use crate::clock::{Clock, SystemClock};
use crate::defs::{
    DEFAULT_EPOCH, DEFAULT_NODE_BITS, DEFAULT_SEQUENCE_BITS, DEFAULT_TIMESTAMP_BITS, END_AT_FORMAT,
};
use crate::error::SnowflakeError;
use crate::layout::{Layout, Parts};
use crate::SnowflakeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub enum IdGenStatus {
    Ready(SnowflakeId),
    /// The sequence for the current millisecond is spent. Nothing was
    /// consumed; try again once the clock has moved on.
    Pending(Duration),
}

/// Generator configuration. Missing fields fall back to the default
/// 44/7/12 layout and the 2006-01-02 epoch.
///
/// # Example
/// ```
/// use snowflake_gen::Options;
///
/// let options: Options = serde_json::from_str(r#"{ "node": 3, "node_bits": 5 }"#).unwrap();
/// assert_eq!(options.node, 3);
/// assert_eq!(options.timestamp_bits, 44);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub node: u64,
    pub timestamp_bits: u8,
    pub node_bits: u8,
    pub sequence_bits: u8,
    /// Milliseconds since the Unix epoch.
    pub epoch: i64,
}

impl Options {
    pub fn with_node(node: u64) -> Self {
        Options {
            node,
            ..Options::default()
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            node: 0,
            timestamp_bits: DEFAULT_TIMESTAMP_BITS,
            node_bits: DEFAULT_NODE_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
            epoch: DEFAULT_EPOCH,
        }
    }
}

/// Validated, immutable part of a generator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub(crate) node: u64,
    pub(crate) epoch: i64,
    pub(crate) layout: Layout,
}

impl Config {
    pub(crate) fn from_options(options: &Options) -> Result<Self, SnowflakeError> {
        let layout = Layout::new(
            options.timestamp_bits,
            options.node_bits,
            options.sequence_bits,
        )?;

        if options.node > layout.max_node() {
            return Err(SnowflakeError::InvalidNode {
                node: options.node,
                max: layout.max_node(),
            });
        }

        debug!(
            node = options.node,
            epoch = options.epoch,
            timestamp_bits = options.timestamp_bits,
            node_bits = options.node_bits,
            sequence_bits = options.sequence_bits,
            "snowflake generator configured"
        );

        Ok(Config {
            node: options.node,
            epoch: options.epoch,
            layout,
        })
    }

    /// The instant at which the timestamp field overflows, or `None` when it
    /// lies beyond what chrono can represent.
    pub(crate) fn end_at_datetime(&self) -> Option<DateTime<Utc>> {
        let end_ms = i128::from(self.epoch) + (1i128 << self.layout.timestamp_bits());
        let secs = i64::try_from(end_ms.div_euclid(1000)).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    pub(crate) fn end_at(&self) -> String {
        self.end_at_datetime()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .format(END_AT_FORMAT)
            .to_string()
    }
}

#[derive(Debug, Default)]
pub(crate) struct GeneratorState {
    last_tick: i64,
    sequence: u64,
}

impl GeneratorState {
    /// One pass of the generation algorithm for the clock reading `now`.
    ///
    /// State is only written when an id is produced. A clock that reads
    /// earlier than the last tick is held at the last tick, so ids never go
    /// backwards.
    pub(crate) fn advance(&mut self, now: i64, config: &Config) -> Result<IdGenStatus, SnowflakeError> {
        let now = if now < self.last_tick {
            warn!(
                drift_ms = self.last_tick - now,
                "clock moved backwards, holding at last tick"
            );
            self.last_tick
        } else {
            now
        };

        let sequence = if now == self.last_tick {
            let next = self.sequence + 1;
            if next > config.layout.max_sequence() {
                return Ok(IdGenStatus::Pending(Duration::from_millis(1)));
            }
            next
        } else {
            0
        };

        // Widened so that extreme epochs cannot overflow.
        let offset = i128::from(now) - i128::from(config.epoch);
        if offset < 0 {
            error!(now, epoch = config.epoch, "clock is before the configured epoch");
            return Err(SnowflakeError::ClockBeforeEpoch {
                now,
                epoch: config.epoch,
            });
        }
        let max = config.layout.max_timestamp();
        if offset > i128::from(max) {
            let offset = i64::try_from(offset).unwrap_or(i64::MAX);
            error!(offset, max, "timestamp range exhausted");
            return Err(SnowflakeError::ClockRangeExhausted { offset, max });
        }

        self.last_tick = now;
        self.sequence = sequence;

        Ok(IdGenStatus::Ready(config.layout.compose(
            offset as u64,
            config.node,
            sequence,
        )))
    }
}

/// A thread-safe Snowflake generator with a configurable bit layout.
///
/// Share one instance (e.g. behind an `Arc`) between threads; every call
/// serialises on a single mutex.
pub struct Generator<C: Clock = SystemClock> {
    config: Config,
    state: Mutex<GeneratorState>,
    clock: C,
}

impl Generator<SystemClock> {
    /// Creates a generator reading the system clock.
    ///
    /// # Example
    /// ```
    /// use snowflake_gen::{Generator, Options};
    ///
    /// let options = Options {
    ///     node: 3,
    ///     timestamp_bits: 41,
    ///     node_bits: 10,
    ///     sequence_bits: 12,
    ///     epoch: 1704067200000,
    /// };
    /// let generator = Generator::new(options).unwrap();
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(generator.decompose(id).node, 3);
    /// ```
    pub fn new(options: Options) -> Result<Self, SnowflakeError> {
        Self::with_clock(options, SystemClock)
    }

    /// Creates a generator with the default 44/7/12 layout and epoch.
    pub fn with_defaults(node: u64) -> Result<Self, SnowflakeError> {
        Self::new(Options::with_node(node))
    }
}

impl<C: Clock> Generator<C> {
    pub fn with_clock(options: Options, clock: C) -> Result<Self, SnowflakeError> {
        Ok(Generator {
            config: Config::from_options(&options)?,
            state: Mutex::new(GeneratorState::default()),
            clock,
        })
    }

    pub fn node(&self) -> u64 {
        self.config.node
    }

    /// Returns the epoch being used by this generator
    pub fn epoch(&self) -> i64 {
        self.config.epoch
    }

    pub fn layout(&self) -> Layout {
        self.config.layout
    }

    pub fn decompose(&self, id: SnowflakeId) -> Parts {
        self.config.layout.decompose(id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn try_next_id(&self) -> Result<IdGenStatus, SnowflakeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SnowflakeError::GeneratorPoisoned)?;

        state.advance(self.clock.now_millis(), &self.config)
    }

    /// Produces the next id, spinning while the current millisecond's
    /// sequence is exhausted.
    pub fn next_id(&self) -> Result<SnowflakeId, SnowflakeError> {
        self.next_id_with(|_| std::hint::spin_loop())
    }

    /// Like [`Generator::next_id`], but calls `on_pending` between clock
    /// samples (e.g. `|_| std::thread::yield_now()`).
    pub fn next_id_with(
        &self,
        mut on_pending: impl FnMut(Duration),
    ) -> Result<SnowflakeId, SnowflakeError> {
        loop {
            match self.try_next_id()? {
                IdGenStatus::Ready(id) => return Ok(id),
                IdGenStatus::Pending(wait) => on_pending(wait),
            }
        }
    }

    /// Produces `count` ids under a single lock acquisition.
    pub fn next_id_bulk(&self, count: usize) -> Result<Vec<SnowflakeId>, SnowflakeError> {
        let mut ids = Vec::with_capacity(count);

        let mut state = self
            .state
            .lock()
            .map_err(|_| SnowflakeError::GeneratorPoisoned)?;

        while ids.len() < count {
            match state.advance(self.clock.now_millis(), &self.config)? {
                IdGenStatus::Ready(id) => ids.push(id),
                IdGenStatus::Pending(_) => std::hint::spin_loop(),
            }
        }

        Ok(ids)
    }

    /// Formats the UTC instant (second precision) after which this generator
    /// can no longer produce ids.
    pub fn end_at(&self) -> String {
        self.config.end_at()
    }

    pub fn end_at_datetime(&self) -> Option<DateTime<Utc>> {
        self.config.end_at_datetime()
    }
}
