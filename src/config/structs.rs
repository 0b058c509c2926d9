use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub exam: SessionPolicy,
    #[serde(default)]
    pub monitor: MonitorPolicy,
    #[serde(default)]
    pub risk: RiskPolicy,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// JWT 配置（仅用于校验，令牌由认证服务签发）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub secret: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 缓存配置（考试目录只读缓存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub default_ttl: u64,
    pub max_capacity: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub max_age: usize,
}

/// 考试会话策略
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    /// 建议客户端自动保存的间隔（秒），服务端不强制
    pub auto_save_interval_seconds: u32,
    /// 过期答卷清扫间隔（秒），0 表示关闭
    pub sweep_interval_seconds: u64,
    /// 历史数据缺失分值时的兜底满分
    pub fallback_max_points: f64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            auto_save_interval_seconds: 30,
            sweep_interval_seconds: 0,
            fallback_max_points: 1.0,
        }
    }
}

/// 实时监控阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorPolicy {
    pub inactivity_minutes: i64,
    pub urgent_remaining_minutes: i64,
    pub struggling_progress_percent: u32,
    pub low_progress_percent: u32,
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            inactivity_minutes: 10,
            urgent_remaining_minutes: 5,
            struggling_progress_percent: 20,
            low_progress_percent: 30,
        }
    }
}

/// 风险等级阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub critical_window_switches: u32,
    pub high_unreviewed_alerts: u32,
    pub medium_window_switches: u32,
    pub notable_window_switches: u32,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            critical_window_switches: 20,
            high_unreviewed_alerts: 5,
            medium_window_switches: 5,
            notable_window_switches: 10,
        }
    }
}
