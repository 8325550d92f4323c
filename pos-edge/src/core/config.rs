use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shared::types::Quantity;

/// 收银终端配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | 控制台输出 JSON |
/// | DATABASE_NAME | RedOnePOS | 数据库文件名 (不含扩展名) |
/// | ALERT_SCAN_INTERVAL_SECS | 30 | 库存预警扫描间隔(秒) |
/// | LOW_STOCK_THRESHOLD | 5 | 低库存阈值 |
/// | SEED_DEFAULT_CATEGORIES | true | 空库时写入默认分类 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos LOW_STOCK_THRESHOLD=3 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub database_name: String,
    /// 库存预警扫描间隔 (秒)
    pub alert_scan_interval_secs: u64,
    pub low_stock_threshold: Quantity,
    pub seed_default_categories: bool,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析时使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            database_name: std::env::var("DATABASE_NAME").unwrap_or_else(|_| "RedOnePOS".into()),
            alert_scan_interval_secs: env_or("ALERT_SCAN_INTERVAL_SECS", 30),
            low_stock_threshold: env_or("LOW_STOCK_THRESHOLD", 5),
            seed_default_categories: env_or("SEED_DEFAULT_CATEGORIES", true),
        }
    }

    /// 指定工作目录，其余取环境变量
    ///
    /// 常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库文件路径: `{work_dir}/database/{database_name}.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join(format!("{}.redb", self.database_name))
    }

    /// 日志目录: `{work_dir}/logs`
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 预警扫描间隔，至少 1 秒
    pub fn alert_scan_interval(&self) -> Duration {
        Duration::from_secs(self.alert_scan_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
