use camino::Utf8Path;
use config::{Config, Environment, File, FileFormat, Source};
use serde::{Deserialize, Serialize};

use crate::cluster::ZIGFRED_CLUSTER_ID;
use crate::device::ZIGFRED_UNO;
use crate::error::{ZigfredError, ZigfredResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Endpoint carrying the buttons cluster. Defaults to the one in the
    /// device signature.
    #[serde(default)]
    pub endpoint: Option<u8>,

    /// Only decode reports without a manufacturer code, or with the Siglis one
    #[serde(default)]
    pub strict_manufacturer: bool,
}

impl DecoderConfig {
    pub fn endpoint(&self) -> ZigfredResult<u8> {
        self.endpoint
            .or_else(|| ZIGFRED_UNO.endpoint_for(ZIGFRED_CLUSTER_ID))
            .ok_or(ZigfredError::NoEndpoint(ZIGFRED_CLUSTER_ID))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
}

fn environment() -> Environment {
    Environment::with_prefix("ZIGFRED")
        .separator("__")
        .try_parsing(true)
}

fn load(
    source: impl Source + Send + Sync + 'static,
    env: Environment,
) -> ZigfredResult<AppConfig> {
    let settings = Config::builder().add_source(source).add_source(env).build()?;

    Ok(settings.try_deserialize()?)
}

/// Load configuration from `filename`, if it exists. `ZIGFRED__DECODER__*`
/// environment variables take precedence.
pub fn parse(filename: &Utf8Path) -> ZigfredResult<AppConfig> {
    load(
        File::new(filename.as_str(), FileFormat::Yaml).required(false),
        environment(),
    )
}
