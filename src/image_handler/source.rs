//! # 转码结果模型

use bytes::Bytes;

/// 转码输出：编码后的字节与推断出的内容类型。
///
/// 由编排器独占持有，写回文件库后所有权转交宿主存储。
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    pub bytes: Bytes,
    /// 例如 `image/jpeg`
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl TranscodeResult {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
