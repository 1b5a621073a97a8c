use clap::Parser;

use crate::logging::{LogFormat, LogLevel};

/// Runtime configuration, read from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "chargeback-webhook-api", version, about = "Chargeback webhook API")]
pub struct Config {
    /// Host name or address to bind the HTTP server to.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on; 0 picks a free one.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log output format (stderr).
    #[arg(long, env = "LOG_FORMAT", value_name = "FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, env = "LOG_LEVEL", value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}
