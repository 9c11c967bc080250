//! Gym Server - 健身房会员管理系统
//!
//! # 架构概述
//!
//! 本模块是 Gym Server 的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **会籍** (`membership`): 会籍状态机、续费和过期判定
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! gym-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── auth/          # JWT 认证、权限
//! ├── membership.rs  # 会籍状态机
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 工具函数
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod membership;
pub mod utils;

// Re-export 公共类型
pub use auth::{ActiveMember, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use membership::{MembershipCheck, expiry_from, reconcile_expiry};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/_  ______ ___
 / / __/ / / / __ `__ \
/ /_/ / /_/ / / / / / /
\____/\__, /_/ /_/ /_/
     /____/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}

/// 设置运行环境
///
/// 按顺序执行：
///
/// 1. 加载 `.env` 文件 (不存在时忽略)
/// 2. 创建工作目录结构 (database/, logs/)
/// 3. 初始化日志 (LOG_LEVEL 环境变量控制级别，生产环境写入日志文件)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    if config.is_production() {
        let logs_dir = config.logs_dir();
        init_logger_with_file(log_level.as_deref(), logs_dir.to_str());
    } else {
        init_logger_with_file(log_level.as_deref(), None);
    }

    Ok(())
}
