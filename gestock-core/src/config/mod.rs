//! Service configuration loaded from `gestock.toml`.

mod service_config;

pub use service_config::{DatabaseConfig, GestockConfig, StockConfig};
