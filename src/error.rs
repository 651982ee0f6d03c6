//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 粘贴处理链路跨越"命名 → 转码 → 移动 → 改写链接"多个阶段，
//! 每个阶段的失败都要在编排器边界被统一捕获、提示并终止本次事件。
//! 因此定义全局统一的 `AppError`，替代各处分散的字符串错误。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` / `std::io::Error` 提供 `From` 转换，调用侧直接 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，便于宿主桥接层原样转发。

use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
///
/// 编排器的所有公开入口均返回此类型。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 前置条件不满足（没有活动文档、找不到对应编辑器等）
    #[error("前置条件不满足: {0}")]
    Precondition(String),

    /// 图片转码失败（解码 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 宿主存储操作失败（重命名、建目录、路径非法等）
    #[error("存储操作失败: {0}")]
    Storage(String),

    /// 设置无效或无法读写
    #[error("设置错误: {0}")]
    Settings(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
