use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZclError {
    /* mapped errors */
    #[error(transparent)]
    FromUtf8Error(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    PackedStructError(#[from] packed_struct::PackingError),

    #[error("Unknown zcl data type {0:02x}")]
    UnknownDataType(u8),

    #[error("Zcl data type {0:?} cannot be used for reporting")]
    UnreportableDataType(crate::attr::ZclDataType),

    #[error("Truncated zcl payload: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
}

pub type ZclResult<T> = Result<T, ZclError>;
