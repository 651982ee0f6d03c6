//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 转码链路的错误分为解码侧与编码侧，两者必须可区分：
//! 调用方据此判断是源文件有问题还是输出阶段失败。
//! 无论哪种失败，调用方都不得写入任何文件。

/// 图片转码统一错误类型。
///
/// 在编排层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 源数据无法识别或解码
    #[error("解码错误：{0}")]
    Decode(String),

    /// 像素数据无法编码为目标格式
    #[error("编码错误：{0}")]
    Encode(String),

    /// 参数不合法（目标格式不支持、质量越界）
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ImageError {
    /// 失败所处阶段，用于日志与提示
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
            Self::InvalidFormat(_) => "validate",
        }
    }
}
