use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 用户删除策略
///
/// | 值 | 行为 |
/// |----|------|
/// | Hard | 物理删除记录，并从课程名单移除 |
/// | Anonymize | 保留记录 (支付历史不丢)，抹除个人信息并锁定账户 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Hard,
    Anonymize,
}

impl DeletionPolicy {
    fn from_env() -> Self {
        match std::env::var("USER_DELETION_POLICY").as_deref() {
            Ok("anonymize") => Self::Anonymize,
            _ => Self::Hard,
        }
    }

    pub fn is_anonymize(&self) -> bool {
        matches!(self, Self::Anonymize)
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/gym/server | 工作目录 |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | MEMBERSHIP_DURATION_DAYS | 365 | 一次续费的会籍时长 (天) |
/// | RESET_TOKEN_TTL_MINUTES | 10 | 密码重置令牌有效期 (分钟) |
/// | MONTHLY_REVENUE_TARGET | 10000 | 月度营收目标 (统计接口用) |
/// | USER_DELETION_POLICY | hard | hard \| anonymize |
///
/// JWT 相关变量 (JWT_SECRET 等) 见 [`JwtConfig`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/gym HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 业务配置 ===
    /// 一次续费的会籍时长 (天)
    pub membership_duration_days: i64,
    /// 密码重置令牌有效期 (分钟)
    pub reset_token_ttl_minutes: i64,
    /// 月度营收目标
    pub monthly_revenue_target: f64,
    /// 用户删除策略
    pub deletion_policy: DeletionPolicy,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/gym/server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            membership_duration_days: std::env::var("MEMBERSHIP_DURATION_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(365),
            reset_token_ttl_minutes: std::env::var("RESET_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            monthly_revenue_target: std::env::var("MONTHLY_REVENUE_TARGET")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10_000.0),
            deletion_policy: DeletionPolicy::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
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

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录: work_dir/logs
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 创建工作目录结构 (work_dir, database/, logs/)
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
