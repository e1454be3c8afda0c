//! Historical replay bar source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use shadow_domain::{Bar, Timeframe};
use shadow_exec::{BarSource, ExecError};

use crate::gateway::PriceFeed;
use crate::historical::load_historical_bars;

#[derive(Debug, Default)]
struct ReplayState {
    pending: VecDeque<Bar>,
    current_price: Option<Decimal>,
}

/// Bar source that releases one historical bar per `collect_bars` call,
/// regardless of the requested range.
///
/// The close of the last released bar is the current market price, which
/// makes the source usable as the [`PriceFeed`] of a simulated gateway.
#[derive(Debug)]
pub struct ReplayBarSource {
    symbol: String,
    file: Option<PathBuf>,
    state: Mutex<ReplayState>,
}

impl ReplayBarSource {
    /// Source that loads `file` on `init()`.
    pub fn new(symbol: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            file: Some(file.into()),
            state: Mutex::new(ReplayState::default()),
        }
    }

    /// Source over bars already in memory.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            file: None,
            state: Mutex::new(ReplayState {
                pending: bars.into(),
                current_price: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bars not yet released.
    pub fn remaining(&self) -> usize {
        self.state().pending.len()
    }
}

#[async_trait]
impl BarSource for ReplayBarSource {
    async fn init(&self) -> Result<(), ExecError> {
        let Some(file) = &self.file else {
            debug!(
                symbol = %self.symbol,
                remaining = self.remaining(),
                "Replay source uses in-memory bars"
            );
            return Ok(());
        };

        info!(symbol = %self.symbol, file = %file.display(), "Initializing replay bar source");
        let bars = load_historical_bars(file)?;

        let mut state = self.state();
        state.pending = bars.into();
        state.current_price = None;
        info!(symbol = %self.symbol, count = state.pending.len(), "Replay bar source initialized");
        Ok(())
    }

    async fn collect_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ExecError> {
        debug!(symbol, %timeframe, %from, %to, "Collecting replay bars");

        let mut state = self.state();
        match state.pending.pop_front() {
            Some(bar) => {
                state.current_price = Some(bar.close);
                Ok(vec![bar])
            }
            None => {
                warn!(symbol, "Historical data exhausted");
                Ok(Vec::new())
            }
        }
    }
}

impl PriceFeed for ReplayBarSource {
    fn current_price(&self) -> Option<Decimal> {
        self.state().current_price
    }
}
