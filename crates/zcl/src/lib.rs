pub mod attr;
pub mod error;
pub mod frame;
pub mod report;
pub mod request;
