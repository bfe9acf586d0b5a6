use serde::{Deserialize, Serialize};

pub use crate::batch::BatchConfig;
pub use crate::converter::ConverterConfig;
pub use crate::session::SessionConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub session: SessionConfig,
}
