use crate::clock::{Clock, SystemClock};
use crate::error::SnowflakeError;
use crate::generator::{Config, GeneratorState, IdGenStatus, Options};
use crate::layout::{Layout, Parts};
use crate::SnowflakeId;
use tokio::sync::Mutex;
use tracing::instrument;

/// The tokio flavour of [`crate::Generator`]: waits on an exhausted sequence
/// with `tokio::time::sleep` instead of spinning.
pub struct AsyncGenerator<C: Clock = SystemClock> {
    config: Config,
    state: Mutex<GeneratorState>,
    clock: C,
}

impl AsyncGenerator<SystemClock> {
    pub fn new(options: Options) -> Result<Self, SnowflakeError> {
        Self::with_clock(options, SystemClock)
    }

    pub fn with_defaults(node: u64) -> Result<Self, SnowflakeError> {
        Self::new(Options::with_node(node))
    }
}

impl<C: Clock> AsyncGenerator<C> {
    pub fn with_clock(options: Options, clock: C) -> Result<Self, SnowflakeError> {
        Ok(AsyncGenerator {
            config: Config::from_options(&options)?,
            state: Mutex::new(GeneratorState::default()),
            clock,
        })
    }

    pub fn node(&self) -> u64 {
        self.config.node
    }

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
    pub async fn try_next_id(&self) -> Result<IdGenStatus, SnowflakeError> {
        let mut state = self.state.lock().await;
        state.advance(self.clock.now_millis(), &self.config)
    }

    pub async fn next_id(&self) -> Result<SnowflakeId, SnowflakeError> {
        loop {
            match self.try_next_id().await? {
                IdGenStatus::Ready(id) => return Ok(id),
                IdGenStatus::Pending(wait) => {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    pub async fn next_id_bulk(&self, count: usize) -> Result<Vec<SnowflakeId>, SnowflakeError> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.next_id().await?);
        }
        Ok(ids)
    }

    pub fn end_at(&self) -> String {
        self.config.end_at()
    }
}
