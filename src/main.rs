use anyhow::{Context, Result};
use eventrouter::{cli, shutdown, Application, ShutdownManager};
use eventrouter_core::{logging, AppConfig};
use tracing::{error, info, info_span, warn, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let config_path = matches.get_one::<String>("config");
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<defaults>")
        )
    })?;
    cli::apply_overrides(&mut config, &matches).context("命令行参数无效")?;

    logging::init_logging(config.debug, config.log_format)?;

    let span = info_span!("service", name = logging::SERVICE_NAME);
    let result = async {
        info!("启动事件路由器 {}", env!("CARGO_PKG_VERSION"));
        info!(
            debug = config.debug,
            insecure = config.insecure,
            resync_interval = ?config.resync_interval,
            throttle_period = ?config.throttle_period,
            namespace = config.namespace().unwrap_or("<all>"),
            queue_max_capacity = config.queue_max_capacity,
            queue_worker_threads = config.queue_worker_threads,
            fixed_endpoint = config.fixed_endpoint().unwrap_or("<none>"),
            payload_format = %config.payload_format,
            "生效配置"
        );

        let kubeconfig = matches.get_one::<String>("kubeconfig").map(String::as_str);
        let app = Application::new(&config, kubeconfig).await?;

        let shutdown_manager = ShutdownManager::new();
        let shutdown_rx = shutdown_manager.subscribe().await;
        let signal_manager = shutdown_manager.clone();
        tokio::spawn(async move {
            shutdown::wait_for_shutdown_signal().await;
            signal_manager.shutdown().await;
        });

        app.run(shutdown_rx).await
    }
    .instrument(span)
    .await;

    // 监听循环结束后总是以非零状态退出，由进程管理器负责重启
    match result {
        Ok(()) => warn!("事件路由器已停止"),
        Err(e) => error!("事件路由器异常退出: {:#}", e),
    }
    std::process::exit(1);
}
