use pos_edge::{PosState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(environment = %config.environment, "RedOne POS edge starting...");

    // 2. 初始化终端状态 (打开数据库, 默认分类)
    let state = PosState::initialize(&config).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to open store");
    })?;

    // 3. 启动后台任务 (库存预警, 日志清理)
    let tasks = state.start_background_tasks();

    // 4. 等待 Ctrl-C
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    if tasks.check_health() > 0 {
        tracing::warn!("Some background tasks had already stopped");
    }
    state.shutdown(tasks).await;
    Ok(())
}
