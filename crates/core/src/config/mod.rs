//! 配置管理
//!
//! 配置在启动时构建一次（默认值 -> TOML文件 -> 环境变量 -> 命令行参数），
//! 之后以不可变值的形式传给各组件的构造函数，不使用全局可变状态。

pub mod models;


pub use models::{AppConfig, LogFormat, ENV_PREFIX};
