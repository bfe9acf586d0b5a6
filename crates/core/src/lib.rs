pub mod batch;
pub mod config;
pub mod converter;
pub mod metrics;
pub mod session;
pub mod testing;

pub use batch::{BatchConfig, BatchConverter, BatchResult, BatchSummary, FailureDetail, StatusUpdate};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use converter::{
    ConversionOutcome, ConversionRequest, Converter, ConverterConfig, ConverterError,
    FailureKind, FfmpegConverter, ProcessRunner, TokioProcessRunner, ToolAvailability, ToolInfo,
};
pub use session::{AppState, BatchHandle, SessionConfig, SessionError, UserInputError};
