pub mod capture;
pub mod cluster;
pub mod config;
pub mod decoder;
pub mod device;
pub mod error;
pub mod event;
pub mod reporting;
pub mod transport;
