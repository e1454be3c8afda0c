//! Historical candlestick files.
//!
//! A data file is a JSON array of candlesticks with prices as strings:
//!
//! ```json
//! [{"timestamp": 1633036800000, "open": "43000.00", "high": "43500.00",
//!   "low": "42500.00", "close": "43200.00", "volume": "1200.5"}]
//! ```

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use shadow_domain::Bar;

use crate::error::{SimError, SimResult};

/// Directory that relative data file names resolve against.
pub const HISTORICAL_DATA_DIR: &str = "historical-data";

/// One raw record of a historical data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candlestick {
    /// Open time, epoch milliseconds
    pub timestamp: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl Candlestick {
    /// Parse the textual prices into a validated [`Bar`].
    pub fn to_bar(&self) -> Result<Bar, String> {
        let time = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .ok_or_else(|| format!("timestamp {} out of range", self.timestamp))?;

        let field = |name: &str, raw: &str| {
            Decimal::from_str(raw)
                .map_err(|e| format!("{} '{}' at {}: {}", name, raw, self.timestamp, e))
        };

        Bar::new(
            time,
            field("open", &self.open)?,
            field("high", &self.high)?,
            field("low", &self.low)?,
            field("close", &self.close)?,
            field("volume", &self.volume)?,
        )
        .map_err(|e| e.to_string())
    }
}

/// Resolve a data file name: absolute paths are used as-is, relative ones
/// live under [`HISTORICAL_DATA_DIR`].
pub fn resolve_path(file: impl AsRef<Path>) -> PathBuf {
    let file = file.as_ref();
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        Path::new(HISTORICAL_DATA_DIR).join(file)
    }
}

/// Read the raw candlesticks at an already resolved path.
///
/// # Errors
/// - `FileNotFound` if the path does not exist
/// - `HistoricalData` if the file cannot be read or is not a candlestick array
fn read_resolved(path: PathBuf) -> SimResult<Vec<Candlestick>> {
    if !path.exists() {
        return Err(SimError::FileNotFound(path));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SimError::HistoricalData {
        path: path.clone(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| SimError::HistoricalData {
        path,
        message: e.to_string(),
    })
}

/// Load a data file as bars, oldest first.
pub fn load_historical_bars(file: impl AsRef<Path>) -> SimResult<Vec<Bar>> {
    let path = resolve_path(file.as_ref());
    debug!(path = %path.display(), "Loading historical bars");

    let candlesticks = read_resolved(path.clone())?;
    let mut bars = candlesticks
        .iter()
        .map(Candlestick::to_bar)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|message| SimError::HistoricalData {
            path: path.clone(),
            message,
        })?;
    bars.sort_by_key(|bar| bar.time);

    info!(path = %path.display(), count = bars.len(), "Loaded historical bars");
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct TempFile(PathBuf);

    impl TempFile {
        fn new(name: &str, content: &str) -> Self {
            let path = std::env::temp_dir()
                .join(format!("shadow-sim-{}-{}", std::process::id(), name));
            std::fs::write(&path, content).unwrap();
            Self(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    const TWO_BARS: &str = r#"[
        {"timestamp": 1633040400000, "open": "43200.00", "high": "43800.00",
         "low": "43000.00", "close": "43700.00", "volume": "1300.7"},
        {"timestamp": 1633036800000, "open": "43000.00", "high": "43500.00",
         "low": "42500.00", "close": "43200.00", "volume": "1200.5"}
    ]"#;

    #[test]
    fn test_load_valid_file() {
        let file = TempFile::new("valid.json", TWO_BARS);

        let raw = read_resolved(resolve_path(&file.0)).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].timestamp, 1633040400000);
        assert_eq!(raw[0].volume, "1300.7");

        let bars = load_historical_bars(&file.0).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time.timestamp_millis(), 1633036800000);
        assert_eq!(bars[0].open, dec!(43000.00));
        assert_eq!(bars[0].close, dec!(43200.00));
        assert_eq!(bars[1].high, dec!(43800.00));
        assert_eq!(bars[1].volume, dec!(1300.7));
    }

    #[test]
    fn test_file_not_found() {
        let err = load_historical_bars("non-existent-file.json").unwrap_err();
        assert!(matches!(err, SimError::FileNotFound(_)));
        assert!(err.to_string().contains("File not found"));
        assert!(err.to_string().contains(HISTORICAL_DATA_DIR));
    }

    #[test]
    fn test_invalid_json() {
        let file = TempFile::new("invalid.json", "This is not valid JSON content");
        let err = load_historical_bars(&file.0).unwrap_err();
        assert!(matches!(err, SimError::HistoricalData { .. }));
        assert!(err.to_string().contains("Error reading or parsing the file"));
    }

    #[test]
    fn test_invalid_bar_values() {
        let file = TempFile::new(
            "inverted.json",
            r#"[{"timestamp": 0, "open": "1", "high": "1", "low": "2", "close": "1", "volume": "0"}]"#,
        );
        assert!(matches!(
            load_historical_bars(&file.0),
            Err(SimError::HistoricalData { .. })
        ));

        let file = TempFile::new(
            "nan.json",
            r#"[{"timestamp": 0, "open": "x", "high": "1", "low": "1", "close": "1", "volume": "0"}]"#,
        );
        assert!(matches!(
            load_historical_bars(&file.0),
            Err(SimError::HistoricalData { .. })
        ));
    }

    #[test]
    fn test_relative_paths_resolve_under_data_dir() {
        assert_eq!(resolve_path("btc.json"), Path::new("historical-data/btc.json"));
        let absolute = std::env::temp_dir().join("btc.json");
        assert_eq!(resolve_path(&absolute), absolute);
    }
}
