//! # 转码编排模块
//!
//! ## 设计思路
//!
//! `ImageTranscoder` 只负责流程编排，不接触文件库：
//! 1. 解码源字节
//! 2. 计算设备像素比校正后的尺寸，并对输出尺寸同样做像素上限检查
//! 3. 白底居中重绘
//! 4. 按目标格式与质量编码
//! 5. 用 `infer` 复核输出的内容类型
//!
//! ## 实现思路
//!
//! - 字节进、字节出，不经过 data URI 文本往返。
//! - 记录 `decode/render/encode/total` 阶段耗时，便于性能诊断。
//! - 纯 CPU 计算，异步调用方应放进 `spawn_blocking`。

use std::time::Instant;

use bytes::Bytes;
use image::GenericImageView;

use super::config::TargetFormat;
use super::pipeline::corrected_dimensions;
use super::{ImageError, TranscodeConfig, TranscodeResult};

/// 图片转码器。
#[derive(Debug, Clone, Default)]
pub struct ImageTranscoder {
    config: TranscodeConfig,
}

impl ImageTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    /// 转码主入口。
    ///
    /// # 参数
    /// * `source` - 任意可解码的栅格图片字节
    /// * `quality` - (0, 1]，仅 JPEG 使用
    /// * `target_mime` - `image/jpeg` / `image/png` / `image/webp`
    ///
    /// # 示例
    /// ```rust,ignore
    /// use paste_image_rename::image_handler::{ImageTranscoder, TranscodeConfig};
    ///
    /// let transcoder = ImageTranscoder::new(TranscodeConfig::default().with_device_pixel_ratio(2.0));
    /// let result = transcoder.transcode(&png_bytes, 0.6, "image/jpeg")?;
    /// assert_eq!(result.content_type, "image/jpeg");
    /// ```
    pub fn transcode(
        &self,
        source: &[u8],
        quality: f32,
        target_mime: &str,
    ) -> Result<TranscodeResult, ImageError> {
        let format = TargetFormat::from_mime(target_mime)?;
        let config = &self.config;
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let decoded = self.decode(source, config)?;
        let (raw_width, raw_height) = decoded.dimensions();
        let decode_elapsed = decode_start.elapsed();

        let render_start = Instant::now();
        let (width, height) = corrected_dimensions(raw_width, raw_height, config);
        Self::validate_pixel_limits(config, width, height)?;
        let canvas = self.render_on_white(&decoded, width, height, config.resize_filter);
        let render_elapsed = render_start.elapsed();

        let encode_start = Instant::now();
        let encoded = self.encode(canvas, format, quality)?;
        let encode_elapsed = encode_start.elapsed();

        let content_type = Self::confirm_content_type(&encoded, format)?;

        log::info!(
            "✅ 图片转码完成 - {}x{} -> {}x{} {} {}KB -> {}KB decode={}ms render={}ms encode={}ms total={}ms",
            raw_width,
            raw_height,
            width,
            height,
            content_type,
            source.len() / 1024,
            encoded.len() / 1024,
            decode_elapsed.as_millis(),
            render_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(TranscodeResult {
            bytes: Bytes::from(encoded),
            content_type,
            width,
            height,
        })
    }

    fn confirm_content_type(encoded: &[u8], format: TargetFormat) -> Result<String, ImageError> {
        let inferred = infer::get(encoded)
            .map(|kind| kind.mime_type())
            .ok_or_else(|| ImageError::Encode("无法识别编码输出的内容类型".to_string()))?;

        if inferred != format.mime() {
            return Err(ImageError::Encode(format!(
                "编码输出类型不符：期望 {}，实际 {}",
                format.mime(),
                inferred
            )));
        }
        Ok(inferred.to_string())
    }
}
