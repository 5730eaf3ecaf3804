use std::{fmt, fs, io};

use market::Candle;

/// A validated candle tape plus the per-candle unix timestamps the clock
/// hands to the engine. Validation happens once at load so the replay loop
/// never sees malformed input.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub candles: Vec<Candle>,
    pub timestamps: Vec<i64>,
}

#[derive(Debug)]
pub enum DatasetError {
    Unreadable(io::Error),
    InvalidJson,
    Empty,
    NonSequentialIndex { expected: usize, found: usize },
    InvalidDate { index: usize },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(err) => write!(f, "candle dataset is unreadable: {err}"),
            Self::InvalidJson => write!(f, "candle dataset is not a valid candle JSON array"),
            Self::Empty => write!(f, "candle dataset contains no candles"),
            Self::NonSequentialIndex { expected, found } => {
                write!(
                    f,
                    "candle index {found} found where {expected} was expected; replay must be sequential"
                )
            }
            Self::InvalidDate { index } => {
                write!(f, "candle {index} carries an unparsable date")
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable(err) => Some(err),
            _ => None,
        }
    }
}

pub fn load_dataset(path: &str) -> Result<Dataset, DatasetError> {
    let raw = fs::read_to_string(path).map_err(DatasetError::Unreadable)?;
    let candles: Vec<Candle> =
        serde_json::from_str(&raw).map_err(|_| DatasetError::InvalidJson)?;

    if candles.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut timestamps = Vec::with_capacity(candles.len());
    for (position, candle) in candles.iter().enumerate() {
        if candle.index != position {
            return Err(DatasetError::NonSequentialIndex {
                expected: position,
                found: candle.index,
            });
        }
        let timestamp = candle
            .timestamp()
            .map_err(|_| DatasetError::InvalidDate { index: position })?;
        timestamps.push(timestamp);
    }

    Ok(Dataset {
        candles,
        timestamps,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{load_dataset, DatasetError};

    fn write_temp_dataset(name: &str, contents: &str) -> std::path::PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("terrain-lab-{name}-{unique}.json"));
        fs::write(&path, contents).expect("temp dataset should be writable");
        path
    }

    fn candle_json(index: usize, date: &str, close: f64) -> String {
        format!(
            r#"{{"date":"{date}","open":{close},"high":{close},"low":{close},"close":{close},
                "volume":1000.0,"dailyReturn":0.0,"intradayVolatility":0.0,"trueRange":1.0,
                "rollingVolatility":0.01,"index":{index}}}"#
        )
    }

    #[test]
    fn loads_sequential_dataset_with_derived_timestamps() {
        let contents = format!(
            "[{},{}]",
            candle_json(0, "2020-03-12", 222.5),
            candle_json(1, "2020-03-13", 230.0)
        );
        let path = write_temp_dataset("ok", &contents);

        let dataset = load_dataset(path.to_str().unwrap()).unwrap();

        assert_eq!(dataset.candles.len(), 2);
        assert_eq!(dataset.timestamps, vec![1_583_971_200, 1_584_057_600]);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_missing_file() {
        let err = load_dataset("/nonexistent/candles.json").unwrap_err();

        assert!(matches!(err, DatasetError::Unreadable(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let path = write_temp_dataset("bad-json", "{not json");

        let err = load_dataset(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, DatasetError::InvalidJson));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_empty_tape() {
        let path = write_temp_dataset("empty", "[]");

        let err = load_dataset(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, DatasetError::Empty));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_out_of_order_candle_indices() {
        let contents = format!(
            "[{},{}]",
            candle_json(0, "2020-03-12", 222.5),
            candle_json(5, "2020-03-13", 230.0)
        );
        let path = write_temp_dataset("gap", &contents);

        let err = load_dataset(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(
            err,
            DatasetError::NonSequentialIndex {
                expected: 1,
                found: 5
            }
        ));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_unparsable_candle_dates() {
        let contents = format!("[{}]", candle_json(0, "03/12/2020", 222.5));
        let path = write_temp_dataset("bad-date", &contents);

        let err = load_dataset(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, DatasetError::InvalidDate { index: 0 }));
        fs::remove_file(path).unwrap();
    }
}
