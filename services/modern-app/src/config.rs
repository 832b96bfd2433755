//! Runtime configuration
//!
//! Every option can be passed as a flag or through the environment, so the
//! service runs unchanged under docker-compose or Kubernetes.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Output format for log lines (stdout and log file alike)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable single-line output
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "modern-app")]
#[command(about = "Order processing simulator for observability demos", long_about = None)]
#[command(version)]
pub struct Config {
    /// Service name attached to spans and log lines
    #[arg(long, env = "SERVICE_NAME", default_value = "modern-app")]
    pub service_name: String,

    /// Log file mirrored from stdout (tailed by the log shipper)
    #[arg(long, env = "LOG_PATH", default_value = "/var/log/modern-app/app.log")]
    pub log_path: PathBuf,

    /// OTLP/HTTP collector base URL
    #[arg(
        long,
        env = "OTEL_EXPORTER_OTLP_ENDPOINT",
        default_value = "http://otel-collector:4318"
    )]
    pub otlp_endpoint: String,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Seconds between periodic summary log lines
    #[arg(
        long,
        env = "SUMMARY_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub summary_interval_secs: u64,

    /// Probability that an order fails as out of stock
    #[arg(long, env = "OUT_OF_STOCK_RATE", default_value_t = 0.10, value_parser = parse_probability)]
    pub out_of_stock_rate: f64,

    /// Probability that a remaining order fails with a declined payment
    #[arg(long, env = "PAYMENT_DECLINE_RATE", default_value_t = 0.15, value_parser = parse_probability)]
    pub payment_decline_rate: f64,
}

impl Config {
    /// Address the HTTP listener binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs)
    }

    /// Signal-specific OTLP traces URL derived from the collector base URL
    pub fn traces_endpoint(&self) -> String {
        format!("{}/v1/traces", self.otlp_endpoint.trim_end_matches('/'))
    }
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} is outside [0, 1]", value));
    }

    Ok(value)
}
