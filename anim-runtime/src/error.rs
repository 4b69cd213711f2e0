//! # Error 模块
//!
//! 定义 anim-runtime 中使用的错误类型。
//!
//! 播放引擎本身没有错误路径（见 [`crate::player`]），
//! 这里只覆盖引擎外围：配置加载/校验与动画类型名解析。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读写配置文件失败
    #[error("配置文件 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析/序列化失败
    #[error("配置 JSON 错误: {0}")]
    Parse(#[from] serde_json::Error),

    /// 配置值不合法
    #[error("配置项 '{field}' 无效 - {message}")]
    Validation { field: String, message: String },
}

impl ConfigError {
    /// 创建校验错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// anim-runtime 统一错误类型
#[derive(Error, Debug)]
pub enum AnimError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 未知的动画类型名
    #[error("未知的动画类型 '{name}'")]
    UnknownKind { name: String },
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
