//! RedOne POS Edge - 单店收银终端核心
//!
//! # 架构概述
//!
//! 面向电子产品/手机配件小店的离线收银核心，UI 层通过 [`PosState`] 调用：
//!
//! - **存储** (`db`): 嵌入式 redb，七个集合 + 二级索引
//! - **库存** (`inventory`): 数量变更 (保底为 0 / CAS / 原子增减)
//! - **业务流程** (`workflows`): 结账、退货、报损、送货单
//! - **预警** (`alerts`): 低库存 / 缺货扫描与去重
//! - **商品** (`catalog`): 商品与分类管理
//! - **报表** (`reports`): 销售报表与首页统计
//! - **备份** (`data_transfer`): JSON 导出 / 全量导入
//! - **条码** (`barcode`): 扫码枪输入解析与条码生成
//!
//! # 模块结构
//!
//! ```text
//! pos-edge/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── db/            # redb 存储层
//! ├── inventory/     # 库存账本
//! ├── workflows/     # 结账/退货/报损/送货
//! ├── alerts/        # 库存预警
//! ├── barcode/       # 扫码与生成
//! ├── utils/         # 日志
//! ├── catalog.rs
//! ├── reports.rs
//! └── data_transfer.rs
//! ```

pub mod alerts;
pub mod barcode;
pub mod catalog;
pub mod core;
pub mod data_transfer;
pub mod db;
pub mod inventory;
pub mod reports;
pub mod utils;
pub mod workflows;

// Re-export 公共类型
pub use crate::core::{BackgroundTasks, Config, PosState, TaskKind};
pub use db::{PosStore, StoreError, StoreResult};
pub use inventory::InventoryLedger;
pub use shared::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在则忽略)
/// 2. 读取配置并创建工作目录
/// 3. 初始化日志 (控制台 + `{work_dir}/logs`)
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let json = config.log_json || config.is_production();
    let logs_dir = config.logs_dir();
    init_logger_with_file(&config.log_level, json, Some(logs_dir.as_path()))?;

    tracing::debug!(
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Environment ready"
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____           ______
   / __ \___  ____/ / __ \____  ___
  / /_/ / _ \/ __  / / / / __ \/ _ \
 / _, _/  __/ /_/ / /_/ / / / /  __/
/_/ |_|\___/\__,_/\____/_/ /_/\___/
        ____  ____  _____
       / __ \/ __ \/ ___/
      / /_/ / / / /\__ \
     / ____/ /_/ /___/ /
    /_/    \____//____/
    "#
    );
}
