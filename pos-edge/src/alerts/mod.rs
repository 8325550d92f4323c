//! Stock alerts
//!
//! [`StockAlertMonitor`] turns low stock into acknowledgeable alerts;
//! [`AlertScheduler`] runs its scan on a fixed interval.

pub mod monitor;
pub mod scheduler;

pub use monitor::{DEFAULT_LOW_STOCK_THRESHOLD, StockAlertMonitor, alert_tier};
pub use scheduler::{AlertScheduler, DEFAULT_SCAN_INTERVAL};
