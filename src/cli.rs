use std::time::Duration;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use eventrouter_core::{models::PayloadFormat, AppConfig, LogFormat};

/// 命令行定义；除 --kubeconfig 外每个参数都可以用对应的 EVENT_ROUTER_* 环境变量给出
pub fn build_cli() -> Command {
    Command::new("eventrouter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("集群事件路由器")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .env("EVENT_ROUTER_CONFIG")
                .help("TOML配置文件路径"),
        )
        .arg(
            Arg::new("kubeconfig")
                .long("kubeconfig")
                .value_name("FILE")
                .help("kubeconfig路径，缺省时使用集群内配置或默认kubeconfig"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .env("EVENT_ROUTER_DEBUG")
                .help("输出调试日志并转储通知请求"),
        )
        .arg(
            Arg::new("insecure")
                .long("insecure")
                .action(ArgAction::SetTrue)
                .env("EVENT_ROUTER_INSECURE")
                .help("通知端点允许无效TLS证书"),
        )
        .arg(
            Arg::new("resync-interval")
                .long("resync-interval")
                .value_name("DURATION")
                .env("EVENT_ROUTER_RESYNC_INTERVAL")
                .value_parser(humantime::parse_duration)
                .help("缓存事件重放间隔，例如 3m；0s 禁用"),
        )
        .arg(
            Arg::new("throttle-period")
                .long("throttle-period")
                .value_name("DURATION")
                .env("EVENT_ROUTER_THROTTLE_PERIOD")
                .value_parser(humantime::parse_duration)
                .help("丢弃早于该时长的事件；0s 禁用"),
        )
        .arg(
            Arg::new("namespace")
                .short('n')
                .long("namespace")
                .value_name("NAMESPACE")
                .env("EVENT_ROUTER_NAMESPACE")
                .help("只监听该命名空间的事件，缺省为全部"),
        )
        .arg(
            Arg::new("queue-max-capacity")
                .long("queue-max-capacity")
                .value_name("N")
                .env("EVENT_ROUTER_QUEUE_MAX_CAPACITY")
                .value_parser(clap::value_parser!(usize))
                .help("通知队列缓冲区大小"),
        )
        .arg(
            Arg::new("queue-worker-threads")
                .long("queue-worker-threads")
                .value_name("N")
                .env("EVENT_ROUTER_QUEUE_WORKER_THREADS")
                .value_parser(clap::value_parser!(usize))
                .help("通知队列工作协程数"),
        )
        .arg(
            Arg::new("fixed-endpoint")
                .long("fixed-endpoint")
                .value_name("URL")
                .env("EVENT_ROUTER_FIXED_ENDPOINT")
                .help("单端点模式：所有通知发往该URL"),
        )
        .arg(
            Arg::new("payload-format")
                .long("payload-format")
                .value_name("FORMAT")
                .env("EVENT_ROUTER_PAYLOAD_FORMAT")
                .value_parser(["rich", "flat"])
                .help("通知负载格式"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .env("EVENT_ROUTER_LOG_FORMAT")
                .value_parser(["json", "pretty"])
                .help("日志格式"),
        )
}

/// 命令行参数覆盖已加载的配置
pub fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) -> Result<()> {
    if matches.get_flag("debug") {
        config.debug = true;
    }
    if matches.get_flag("insecure") {
        config.insecure = true;
    }
    if let Some(interval) = matches.get_one::<Duration>("resync-interval") {
        config.resync_interval = *interval;
    }
    if let Some(period) = matches.get_one::<Duration>("throttle-period") {
        config.throttle_period = *period;
    }
    if let Some(namespace) = matches.get_one::<String>("namespace") {
        config.namespace = namespace.clone();
    }
    if let Some(capacity) = matches.get_one::<usize>("queue-max-capacity") {
        config.queue_max_capacity = *capacity;
    }
    if let Some(workers) = matches.get_one::<usize>("queue-worker-threads") {
        config.queue_worker_threads = *workers;
    }
    if let Some(endpoint) = matches.get_one::<String>("fixed-endpoint") {
        config.fixed_endpoint = endpoint.clone();
    }
    if let Some(format) = matches.get_one::<String>("payload-format") {
        config.payload_format = format.parse::<PayloadFormat>()?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.log_format = format.parse::<LogFormat>().map_err(|e| anyhow::anyhow!(e))?;
    }

    config.validate()
}
