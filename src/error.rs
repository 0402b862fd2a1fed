use thiserror::Error;

use crate::decoder::DecodeError;

#[derive(Error, Debug)]
pub enum ZigfredError {
    /* mapped errors */
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),

    #[error(transparent)]
    SetLoggerError(#[from] log::SetLoggerError),

    #[error(transparent)]
    ZclError(#[from] zcl::error::ZclError),

    #[error(transparent)]
    DecodeError(#[from] DecodeError),

    /* transport errors */
    #[error("Zigbee transport failure: {0}")]
    Transport(String),

    #[error("Timeout waiting for zigbee response")]
    Timeout,

    /* protocol errors */
    #[error("Unexpected zcl response command {0:02x}")]
    UnexpectedResponse(u8),

    #[error("No endpoint hosts cluster {0:04x}")]
    NoEndpoint(u16),
}

pub type ZigfredResult<T> = Result<T, ZigfredError>;
