use std::fmt;

#[derive(Debug, Clone)]
pub enum UtmLoggerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    BlobStore(String),
    Validation(String),
    Serialization(String),
    Transport(String),
}

impl UtmLoggerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            UtmLoggerError::DatabaseConfig(_) => "E001",
            UtmLoggerError::DatabaseConnection(_) => "E002",
            UtmLoggerError::DatabaseOperation(_) => "E003",
            UtmLoggerError::FileOperation(_) => "E004",
            UtmLoggerError::BlobStore(_) => "E005",
            UtmLoggerError::Validation(_) => "E006",
            UtmLoggerError::Serialization(_) => "E007",
            UtmLoggerError::Transport(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            UtmLoggerError::DatabaseConfig(_) => "Database Configuration Error",
            UtmLoggerError::DatabaseConnection(_) => "Database Connection Error",
            UtmLoggerError::DatabaseOperation(_) => "Database Operation Error",
            UtmLoggerError::FileOperation(_) => "File Operation Error",
            UtmLoggerError::BlobStore(_) => "Blob Store Error",
            UtmLoggerError::Validation(_) => "Validation Error",
            UtmLoggerError::Serialization(_) => "Serialization Error",
            UtmLoggerError::Transport(_) => "Transport Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            UtmLoggerError::DatabaseConfig(msg)
            | UtmLoggerError::DatabaseConnection(msg)
            | UtmLoggerError::DatabaseOperation(msg)
            | UtmLoggerError::FileOperation(msg)
            | UtmLoggerError::BlobStore(msg)
            | UtmLoggerError::Validation(msg)
            | UtmLoggerError::Serialization(msg)
            | UtmLoggerError::Transport(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for UtmLoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for UtmLoggerError {}

// 便捷的构造函数
impl UtmLoggerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::FileOperation(msg.into())
    }

    pub fn blob_store<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::BlobStore(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::Serialization(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        UtmLoggerError::Transport(msg.into())
    }
}

impl From<sea_orm::DbErr> for UtmLoggerError {
    fn from(err: sea_orm::DbErr) -> Self {
        UtmLoggerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for UtmLoggerError {
    fn from(err: std::io::Error) -> Self {
        UtmLoggerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for UtmLoggerError {
    fn from(err: serde_json::Error) -> Self {
        UtmLoggerError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for UtmLoggerError {
    fn from(err: redis::RedisError) -> Self {
        UtmLoggerError::BlobStore(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UtmLoggerError>;
