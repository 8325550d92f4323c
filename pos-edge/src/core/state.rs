use std::sync::Arc;

use shared::util::now_millis;

use crate::alerts::{AlertScheduler, StockAlertMonitor};
use crate::barcode::BarcodeScanner;
use crate::catalog::Catalog;
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::{PosStore, StoreResult};
use crate::inventory::InventoryLedger;
use crate::reports::Reports;
use crate::utils::logger::periodic_cleanup;
use crate::workflows::{Cart, CheckoutWorkflow, DamageWorkflow, DeliveryWorkflow, ReturnWorkflow};

/// 终端状态 - 持有所有服务的共享引用
///
/// 所有服务都围绕同一个 [`PosStore`] 句柄构造，克隆成本极低。
/// 没有全局单例，UI 层持有一个 `PosState` 即可。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | PosStore | redb 存储 |
/// | ledger | InventoryLedger | 库存数量变更 |
/// | catalog | Catalog | 商品/分类管理 |
/// | checkout | CheckoutWorkflow | 收银结账 |
/// | returns | ReturnWorkflow | 退货 |
/// | damage | DamageWorkflow | 报损 |
/// | delivery | DeliveryWorkflow | 送货单 |
/// | alerts | StockAlertMonitor | 库存预警 |
/// | reports | Reports | 报表 |
/// | scanner | Arc<BarcodeScanner> | 扫码枪输入 |
#[derive(Clone, Debug)]
pub struct PosState {
    pub config: Config,
    pub store: PosStore,
    pub ledger: InventoryLedger,
    pub catalog: Catalog,
    pub checkout: CheckoutWorkflow,
    pub returns: ReturnWorkflow,
    pub damage: DamageWorkflow,
    pub delivery: DeliveryWorkflow,
    pub alerts: StockAlertMonitor,
    pub reports: Reports,
    pub scanner: Arc<BarcodeScanner>,
}

impl PosState {
    /// 围绕已打开的存储构造所有服务
    pub fn new(config: Config, store: PosStore) -> Self {
        let ledger = InventoryLedger::new(store.clone());
        Self {
            catalog: Catalog::new(store.clone()),
            checkout: CheckoutWorkflow::new(store.clone(), ledger.clone()),
            returns: ReturnWorkflow::new(store.clone(), ledger.clone()),
            damage: DamageWorkflow::new(store.clone(), ledger.clone()),
            delivery: DeliveryWorkflow::new(store.clone()),
            alerts: StockAlertMonitor::with_threshold(store.clone(), config.low_stock_threshold),
            reports: Reports::new(store.clone(), config.low_stock_threshold),
            scanner: Arc::new(BarcodeScanner::new()),
            ledger,
            store,
            config,
        }
    }

    /// 初始化终端状态
    ///
    /// 1. 打开 `{work_dir}/database/{DATABASE_NAME}.redb` (不存在则创建)
    /// 2. 空库时写入默认分类 (`SEED_DEFAULT_CATEGORIES`)
    pub async fn initialize(config: &Config) -> StoreResult<Self> {
        let store = PosStore::open(config.database_path())?;
        let state = Self::new(config.clone(), store);

        if config.seed_default_categories {
            match state.catalog.seed_default_categories().await {
                Ok(0) => {}
                Ok(seeded) => tracing::info!(seeded, "Default categories created"),
                Err(e) => tracing::warn!(error = %e, "Failed to seed default categories"),
            }
        }

        let schema_version = state.store.schema_version().await?;
        tracing::info!(
            path = %config.database_path().display(),
            ?schema_version,
            "POS state initialized"
        );
        Ok(state)
    }

    /// 新的空购物车
    pub fn new_cart(&self) -> Cart {
        Cart::new(self.store.clone())
    }

    /// 启动后台任务
    ///
    /// - `startup_summary` (Warmup): 记录各集合数量
    /// - `stock_alert_scan` (Periodic): 库存预警扫描
    /// - `log_cleanup` (Periodic): 清理过期日志
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let store = self.store.clone();
        tasks.spawn("startup_summary", TaskKind::Warmup, async move {
            log_store_summary(&store).await;
        });

        let scheduler = AlertScheduler::new(
            self.alerts.clone(),
            self.config.alert_scan_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("stock_alert_scan", TaskKind::Periodic, scheduler.run());

        tasks.spawn(
            "log_cleanup",
            TaskKind::Periodic,
            periodic_cleanup(self.config.logs_dir(), tasks.shutdown_token()),
        );

        tasks.log_summary();
        tasks
    }

    /// 停止后台任务并关闭存储
    pub async fn shutdown(self, tasks: BackgroundTasks) {
        tasks.shutdown().await;
        self.store.close();
        tracing::info!(at = now_millis(), "POS state shut down");
    }
}

async fn log_store_summary(store: &PosStore) {
    use shared::models::{Category, Invoice, Product, StockAlert};

    let counts = async {
        Ok::<_, crate::db::StoreError>((
            store.count::<Product>().await?,
            store.count::<Invoice>().await?,
            store.count::<Category>().await?,
            store.count::<StockAlert>().await?,
        ))
    };
    match counts.await {
        Ok((products, invoices, categories, alerts)) => {
            tracing::info!(products, invoices, categories, alerts, "Store contents");
        }
        Err(e) => tracing::warn!(error = %e, "Failed to read store summary"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Category, DEFAULT_CATEGORIES};

    #[tokio::test]
    async fn test_initialize_seeds_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy());
        config.database_name = "RedOnePOS".into();
        config.seed_default_categories = true;

        let state = PosState::initialize(&config).await.unwrap();
        assert!(dir.path().join("database").join("RedOnePOS.redb").exists());
        assert_eq!(
            state.store.count::<Category>().await.unwrap(),
            DEFAULT_CATEGORIES.len() as u64
        );

        let tasks = state.start_background_tasks();
        assert_eq!(tasks.count_by_kind(), (1, 2));

        let store = state.store.clone();
        state.shutdown(tasks).await;
        assert!(!store.is_open());
    }
}
