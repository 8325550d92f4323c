//! 核心模块 - 配置、状态和后台任务
//!
//! - [`Config`] - 终端配置 (环境变量)
//! - [`PosState`] - 所有服务的共享句柄
//! - [`BackgroundTasks`] - 后台任务生命周期

pub mod config;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use state::PosState;
pub use tasks::{BackgroundTasks, TaskKind};
