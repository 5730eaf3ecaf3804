use std::{env, fmt};

const DEFAULT_CANDLES_PATH: &str = "data/candles.json";
const DEFAULT_REPLAY_OUTPUT_PATH: &str = "artifacts/replay.csv";
const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
const DEFAULT_MAX_LEVERAGE: f64 = 3.0;
const DEFAULT_PLAYER_LEVEL: u32 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub candles_path: String,
    pub replay_output_path: String,
    pub initial_capital: f64,
    pub max_leverage: f64,
    pub player_level: u32,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidCandlesPath,
    InvalidReplayOutputPath,
    InvalidInitialCapital,
    InvalidMaxLeverage,
    InvalidPlayerLevel,
    NonUnicodeCandlesPath,
    NonUnicodeReplayOutput,
    NonUnicodeInitialCapital,
    NonUnicodeMaxLeverage,
    NonUnicodePlayerLevel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCandlesPath => {
                write!(f, "TERRAIN_LAB_CANDLES_PATH must not be empty or whitespace")
            }
            Self::InvalidReplayOutputPath => {
                write!(
                    f,
                    "TERRAIN_LAB_REPLAY_OUTPUT must not be empty or whitespace"
                )
            }
            Self::InvalidInitialCapital => {
                write!(
                    f,
                    "TERRAIN_LAB_INITIAL_CAPITAL must be a finite positive number"
                )
            }
            Self::InvalidMaxLeverage => {
                write!(
                    f,
                    "TERRAIN_LAB_MAX_LEVERAGE must be a finite positive number"
                )
            }
            Self::InvalidPlayerLevel => {
                write!(f, "TERRAIN_LAB_PLAYER_LEVEL must be a positive integer")
            }
            Self::NonUnicodeCandlesPath => {
                write!(f, "TERRAIN_LAB_CANDLES_PATH contains non-unicode data")
            }
            Self::NonUnicodeReplayOutput => {
                write!(f, "TERRAIN_LAB_REPLAY_OUTPUT contains non-unicode data")
            }
            Self::NonUnicodeInitialCapital => {
                write!(f, "TERRAIN_LAB_INITIAL_CAPITAL contains non-unicode data")
            }
            Self::NonUnicodeMaxLeverage => {
                write!(f, "TERRAIN_LAB_MAX_LEVERAGE contains non-unicode data")
            }
            Self::NonUnicodePlayerLevel => {
                write!(f, "TERRAIN_LAB_PLAYER_LEVEL contains non-unicode data")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let candles_path = parse_path_env(
            "TERRAIN_LAB_CANDLES_PATH",
            DEFAULT_CANDLES_PATH,
            ConfigError::InvalidCandlesPath,
            ConfigError::NonUnicodeCandlesPath,
        )?;

        let replay_output_path = parse_path_env(
            "TERRAIN_LAB_REPLAY_OUTPUT",
            DEFAULT_REPLAY_OUTPUT_PATH,
            ConfigError::InvalidReplayOutputPath,
            ConfigError::NonUnicodeReplayOutput,
        )?;

        let initial_capital = parse_positive_f64_env(
            "TERRAIN_LAB_INITIAL_CAPITAL",
            DEFAULT_INITIAL_CAPITAL,
            ConfigError::InvalidInitialCapital,
            ConfigError::NonUnicodeInitialCapital,
        )?;

        let max_leverage = parse_positive_f64_env(
            "TERRAIN_LAB_MAX_LEVERAGE",
            DEFAULT_MAX_LEVERAGE,
            ConfigError::InvalidMaxLeverage,
            ConfigError::NonUnicodeMaxLeverage,
        )?;

        let player_level = match env::var("TERRAIN_LAB_PLAYER_LEVEL") {
            Ok(value) => match value.parse::<u32>() {
                Ok(parsed) if parsed >= 1 => parsed,
                _ => return Err(ConfigError::InvalidPlayerLevel),
            },
            Err(env::VarError::NotPresent) => DEFAULT_PLAYER_LEVEL,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodePlayerLevel);
            }
        };

        Ok(Self {
            candles_path,
            replay_output_path,
            initial_capital,
            max_leverage,
            player_level,
        })
    }
}

fn parse_path_env(
    key: &str,
    default_value: &str,
    invalid_error: ConfigError,
    non_unicode_error: ConfigError,
) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            if value.trim().is_empty() {
                return Err(invalid_error);
            }
            Ok(value)
        }
        Err(env::VarError::NotPresent) => Ok(default_value.to_owned()),
        Err(env::VarError::NotUnicode(_)) => Err(non_unicode_error),
    }
}

fn parse_positive_f64_env(
    key: &str,
    default_value: f64,
    invalid_error: ConfigError,
    non_unicode_error: ConfigError,
) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let parsed = match value.parse::<f64>() {
                Ok(parsed) => parsed,
                Err(_) => return Err(invalid_error),
            };
            if !parsed.is_finite() || parsed <= 0.0 {
                return Err(invalid_error);
            }
            Ok(parsed)
        }
        Err(env::VarError::NotPresent) => Ok(default_value),
        Err(env::VarError::NotUnicode(_)) => Err(non_unicode_error),
    }
}
