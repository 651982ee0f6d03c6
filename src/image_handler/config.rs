//! # 配置模块
//!
//! ## 设计思路
//!
//! 转码的可调策略集中在 `TranscodeConfig`：设备像素比、解码像素上限、缩放滤镜。
//! 目标格式与质量随每次调用传入，因为它们来自每次事件的设置快照。
//!
//! ## 实现思路
//!
//! - `TargetFormat` 负责 MIME 字符串解析与扩展名输出。
//! - 质量按 0~1 的浮点数接收，JPEG 编码时映射到 1~100。

use image::imageops::FilterType;

use super::ImageError;

/// 转码配置。
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// 显示器设备像素比，输出尺寸按其倒数缩放。
    pub device_pixel_ratio: f64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            max_decoded_pixels: 40_000_000,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl TranscodeConfig {
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// 非正数或非有限值按 1.0 处理。
    pub(crate) fn effective_pixel_ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

/// 转码目标格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    /// 仅支持无损编码，忽略质量参数
    WebP,
}

impl TargetFormat {
    /// 从 MIME 字符串解析目标格式。
    ///
    /// # 示例
    /// ```rust
    /// use paste_image_rename::image_handler::TargetFormat;
    ///
    /// let format = TargetFormat::from_mime("image/jpeg")?;
    /// assert_eq!(format.extension(), "jpeg");
    /// # Ok::<(), paste_image_rename::image_handler::ImageError>(())
    /// ```
    pub fn from_mime(mime: &str) -> Result<Self, ImageError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::WebP),
            other => Err(ImageError::InvalidFormat(format!(
                "不支持的目标格式：{}（可选：image/jpeg / image/png / image/webp）",
                other
            ))),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// 重命名时使用的扩展名。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// 校验质量并映射到 JPEG 编码器的 1~100。
pub(crate) fn jpeg_quality(quality: f32) -> Result<u8, ImageError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ImageError::InvalidFormat(format!(
            "质量必须在 (0, 1] 之间，当前为 {}",
            quality
        )));
    }
    Ok((quality * 100.0).round().clamp(1.0, 100.0) as u8)
}
