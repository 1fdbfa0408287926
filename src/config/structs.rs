use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 存储后端类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// 单个 JSON 文件
    #[default]
    File,
    /// 对象存储中的单个 JSON 对象
    Blob,
    /// SQL 表（SQLite / MySQL / PostgreSQL）
    Relational,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        BackendKind::iter()
            .find(|kind| kind.as_ref() == lowered)
            .ok_or_else(|| {
                let valid: Vec<String> = BackendKind::iter().map(|k| k.as_ref().to_string()).collect();
                format!(
                    "Invalid storage backend: '{}'. Valid: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Blob 存储的对象存储实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlobProvider {
    /// HTTP object store (HEAD / GET / PUT)
    #[default]
    Http,
    /// Redis key (EXISTS / GET / SET)
    Redis,
    /// Process-local, lost on restart
    Memory,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量
/// - storage: 存储后端选择及各后端参数
/// - cors: 跨域配置（采集脚本通常运行在其他域名下）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：UTM，分隔符：__
    /// 示例：UTM__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("UTM")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub file: FileStorageConfig,
    #[serde(default)]
    pub blob: BlobStorageConfig,
    #[serde(default)]
    pub relational: RelationalStorageConfig,
}

/// 文件后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStorageConfig {
    #[serde(default = "default_file_path")]
    pub path: String,
    #[serde(default = "default_file_retention_cap")]
    pub retention_cap: usize,
}

/// Blob 后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStorageConfig {
    #[serde(default)]
    pub provider: BlobProvider,
    /// HTTP provider: object URL = `{base_url}/{key}`
    #[serde(default = "default_blob_base_url")]
    pub base_url: String,
    /// Optional bearer token sent with every HTTP request
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_blob_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_blob_key")]
    pub key: String,
    #[serde(default = "default_blob_retention_cap")]
    pub retention_cap: usize,
    #[serde(default = "default_blob_timeout")]
    pub timeout_secs: u64,
}

/// 关系型后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationalStorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 读取时返回的最大行数（写入时不截断）
    #[serde(default = "default_read_limit")]
    pub read_limit: u64,
    /// 启动时自动建表；关闭后需调用 GET /api/init-db
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    /// `["*"]` allows any origin
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_file_path() -> String {
    "utm-logs.json".to_string()
}

fn default_file_retention_cap() -> usize {
    1000
}

fn default_blob_base_url() -> String {
    "http://127.0.0.1:9000/utm".to_string()
}

fn default_blob_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_blob_key() -> String {
    "utm-logs.json".to_string()
}

fn default_blob_retention_cap() -> usize {
    500
}

fn default_blob_timeout() -> u64 {
    10
}

fn default_database_url() -> String {
    "sqlite://utm_logs.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_read_limit() -> u64 {
    100
}

fn default_auto_migrate() -> bool {
    true
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            path: default_file_path(),
            retention_cap: default_file_retention_cap(),
        }
    }
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        Self {
            provider: BlobProvider::default(),
            base_url: default_blob_base_url(),
            token: None,
            redis_url: default_blob_redis_url(),
            key: default_blob_key(),
            retention_cap: default_blob_retention_cap(),
            timeout_secs: default_blob_timeout(),
        }
    }
}

impl Default for RelationalStorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            read_limit: default_read_limit(),
            auto_migrate: default_auto_migrate(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: default_cors_origins(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retention_caps() {
        let config = StaticConfig::default();
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.storage.file.retention_cap, 1000);
        assert_eq!(config.storage.blob.retention_cap, 500);
        assert_eq!(config.storage.relational.read_limit, 100);
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("file".parse::<BackendKind>(), Ok(BackendKind::File));
        assert_eq!("BLOB".parse::<BackendKind>(), Ok(BackendKind::Blob));
        assert_eq!(
            "relational".parse::<BackendKind>(),
            Ok(BackendKind::Relational)
        );
        assert!("sled".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[storage.file]"));

        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.storage.blob.key, "utm-logs.json");
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [storage]
            backend = "blob"

            [storage.blob]
            provider = "redis"
            retention_cap = 50
            "#,
        )
        .unwrap();

        assert_eq!(parsed.storage.backend, BackendKind::Blob);
        assert_eq!(parsed.storage.blob.provider, BlobProvider::Redis);
        assert_eq!(parsed.storage.blob.retention_cap, 50);
        assert_eq!(parsed.storage.file.retention_cap, 1000);
    }
}
