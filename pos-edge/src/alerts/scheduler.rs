//! 库存告警调度器
//!
//! 启动时立即扫描一次，之后按固定间隔扫描，直到收到 shutdown 信号。
//! 扫描失败只记录日志，不会终止调度器。

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::monitor::StockAlertMonitor;

/// Default scan interval
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// 库存告警调度器
///
/// 注册为 `TaskKind::Periodic`，由 [`crate::core::BackgroundTasks`] 管理。
pub struct AlertScheduler {
    monitor: StockAlertMonitor,
    interval: Duration,
    shutdown: CancellationToken,
}

impl AlertScheduler {
    pub fn new(monitor: StockAlertMonitor, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            monitor,
            interval,
            shutdown,
        }
    }

    /// 主循环：首次扫描 → 周期扫描
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            threshold = self.monitor.low_stock_threshold(),
            "Stock alert scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // 等待触发或 shutdown
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Stock alert scheduler received shutdown signal");
                    break;
                }
            }

            match self.monitor.scan().await {
                Ok(created) if !created.is_empty() => {
                    tracing::debug!(count = created.len(), "Scheduled stock scan finished");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled stock scan failed");
                }
            }
        }

        tracing::info!("Stock alert scheduler stopped");
    }
}
