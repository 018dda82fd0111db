mod config;
pub use config::{LoggerConfig, LoggerFormat, LoggerLevel};

mod error;
pub use error::{LoggerError, LoggerResult};

mod init;
pub use init::init_logger;
