use std::fmt;

#[derive(Debug, Clone)]
pub enum RadiodirError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    Validation(String),
    InvalidReference(String),
    SourceUnavailable(String),
    AggregationUnavailable(String),
}

impl RadiodirError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RadiodirError::DatabaseConfig(_) => "E001",
            RadiodirError::DatabaseConnection(_) => "E002",
            RadiodirError::DatabaseOperation(_) => "E003",
            RadiodirError::Serialization(_) => "E004",
            RadiodirError::Validation(_) => "E005",
            RadiodirError::InvalidReference(_) => "E006",
            RadiodirError::SourceUnavailable(_) => "E007",
            RadiodirError::AggregationUnavailable(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RadiodirError::DatabaseConfig(_) => "Database Configuration Error",
            RadiodirError::DatabaseConnection(_) => "Database Connection Error",
            RadiodirError::DatabaseOperation(_) => "Database Operation Error",
            RadiodirError::Serialization(_) => "Serialization Error",
            RadiodirError::Validation(_) => "Validation Error",
            RadiodirError::InvalidReference(_) => "Invalid Station Reference",
            RadiodirError::SourceUnavailable(_) => "Catalog Source Unavailable",
            RadiodirError::AggregationUnavailable(_) => "Aggregation Unavailable",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            RadiodirError::DatabaseConfig(msg) => msg,
            RadiodirError::DatabaseConnection(msg) => msg,
            RadiodirError::DatabaseOperation(msg) => msg,
            RadiodirError::Serialization(msg) => msg,
            RadiodirError::Validation(msg) => msg,
            RadiodirError::InvalidReference(msg) => msg,
            RadiodirError::SourceUnavailable(msg) => msg,
            RadiodirError::AggregationUnavailable(msg) => msg,
        }
    }

    /// 单个目录源失败属于软错误，聚合器降级处理而不向上传播
    pub fn is_soft(&self) -> bool {
        matches!(self, RadiodirError::SourceUnavailable(_))
    }
}

impl fmt::Display for RadiodirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for RadiodirError {}

// 便捷的构造函数
impl RadiodirError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        RadiodirError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        RadiodirError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        RadiodirError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RadiodirError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RadiodirError::Validation(msg.into())
    }

    pub fn invalid_reference<T: Into<String>>(msg: T) -> Self {
        RadiodirError::InvalidReference(msg.into())
    }

    pub fn source_unavailable<T: Into<String>>(msg: T) -> Self {
        RadiodirError::SourceUnavailable(msg.into())
    }

    pub fn aggregation_unavailable<T: Into<String>>(msg: T) -> Self {
        RadiodirError::AggregationUnavailable(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for RadiodirError {
    fn from(err: sea_orm::DbErr) -> Self {
        RadiodirError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for RadiodirError {
    fn from(err: std::io::Error) -> Self {
        RadiodirError::DatabaseConnection(err.to_string())
    }
}

impl From<serde_json::Error> for RadiodirError {
    fn from(err: serde_json::Error) -> Self {
        RadiodirError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RadiodirError>;
