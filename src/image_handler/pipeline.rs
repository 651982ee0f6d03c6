//! # 解码与重绘流水线模块
//!
//! ## 设计思路
//!
//! 将"字节 → 图像 → 白底画布 → 目标格式字节"集中管理。
//! 优先读取 header 尺寸做像素上限检查，再进行完整解码。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 按设备像素比倒数计算输出尺寸
//! 5. 铺满不透明白色后居中绘制（JPEG 没有透明通道，不铺白底透明区域会变黑）
//! 6. 按目标格式与质量编码

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageBuffer, ImageEncoder, ImageReader,
    Rgba, RgbaImage,
};
use std::io::Cursor;

use super::config::{jpeg_quality, TargetFormat};
use super::{ImageError, ImageTranscoder, TranscodeConfig};

const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 按设备像素比的倒数缩放尺寸，单边最少 1 像素。
///
/// 像素比取 [`TranscodeConfig::effective_pixel_ratio`]；结果可能大于源尺寸，
/// 调用方需再做像素上限检查。
pub fn corrected_dimensions(width: u32, height: u32, config: &TranscodeConfig) -> (u32, u32) {
    let ratio = config.effective_pixel_ratio();
    let scale = |value: u32| ((f64::from(value) / ratio).floor() as u32).max(1);
    (scale(width), scale(height))
}

impl ImageTranscoder {
    /// 解码源字节，失败统一归为 `ImageError::Decode`。
    pub(crate) fn decode(
        &self,
        bytes: &[u8],
        config: &TranscodeConfig,
    ) -> Result<DynamicImage, ImageError> {
        image::guess_format(bytes)
            .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;

        Ok(decoded)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    pub(crate) fn validate_pixel_limits(
        config: &TranscodeConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }
        Ok(())
    }

    /// 在 `width x height` 的白色不透明画布上居中绘制图像。
    ///
    /// 先平移到画布中心，再按绘制尺寸的一半反向偏移。
    pub(crate) fn render_on_white(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(width, height, OPAQUE_WHITE);
        let drawn = Self::scale_to(image, width, height, filter);

        let x = i64::from(width) / 2 - i64::from(drawn.width()) / 2;
        let y = i64::from(height) / 2 - i64::from(drawn.height()) / 2;
        image::imageops::overlay(&mut canvas, &drawn, x, y);

        canvas
    }

    fn scale_to(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> RgbaImage {
        if image.dimensions() == (width, height) {
            return image.to_rgba8();
        }

        match Self::resize_with_fast_image_resize(image, width, height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}",
                    err
                );
                image.resize_exact(width, height, filter).to_rgba8()
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ImageError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }

    /// 将画布编码为目标格式，失败统一归为 `ImageError::Encode`。
    pub(crate) fn encode(
        &self,
        canvas: RgbaImage,
        format: TargetFormat,
        quality: f32,
    ) -> Result<Vec<u8>, ImageError> {
        let (width, height) = canvas.dimensions();
        let mut buf = Vec::new();

        let result = match format {
            TargetFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality)?).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            TargetFormat::Png => PngEncoder::new(&mut buf).write_image(
                canvas.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            TargetFormat::WebP => WebPEncoder::new_lossless(&mut buf).write_image(
                canvas.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        };

        result.map_err(|e| ImageError::Encode(format!("{} 编码失败：{}", format.mime(), e)))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_ratio(ratio: f64) -> TranscodeConfig {
        TranscodeConfig::default().with_device_pixel_ratio(ratio)
    }

    #[test]
    fn halves_dimensions_on_retina() {
        assert_eq!(corrected_dimensions(800, 600, &at_ratio(2.0)), (400, 300));
    }

    #[test]
    fn keeps_dimensions_at_ratio_one() {
        assert_eq!(corrected_dimensions(801, 599, &at_ratio(1.0)), (801, 599));
    }

    #[test]
    fn fractional_ratio_truncates_and_never_hits_zero() {
        assert_eq!(corrected_dimensions(1000, 500, &at_ratio(1.5)), (666, 333));
        assert_eq!(corrected_dimensions(1, 1, &at_ratio(4.0)), (1, 1));
        assert_eq!(corrected_dimensions(10, 10, &at_ratio(0.0)), (10, 10));
    }

    #[test]
    fn ratio_below_one_enlarges() {
        assert_eq!(corrected_dimensions(100, 50, &at_ratio(0.5)), (200, 100));
    }

    #[test]
    fn transparent_source_renders_white() {
        let transcoder = ImageTranscoder::new(TranscodeConfig::default());
        let transparent = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));

        let canvas = transcoder.render_on_white(&transparent, 4, 4, FilterType::Triangle);
        assert!(canvas.pixels().all(|p| *p == OPAQUE_WHITE));
    }

    #[test]
    fn half_transparent_black_blends_to_grey() {
        let transcoder = ImageTranscoder::new(TranscodeConfig::default());
        let shade = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 128])));

        let canvas = transcoder.render_on_white(&shade, 4, 4, FilterType::Triangle);
        for pixel in canvas.pixels() {
            assert_eq!(pixel[3], 255);
            assert!((115..=140).contains(&pixel[0]), "unexpected channel {}", pixel[0]);
        }
    }

    #[test]
    fn opaque_source_is_drawn_edge_to_edge() {
        let transcoder = ImageTranscoder::new(TranscodeConfig::default());
        let red = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([255, 0, 0, 255])));

        let canvas = transcoder.render_on_white(&red, 3, 3, FilterType::Triangle);
        assert_eq!(canvas.dimensions(), (3, 3));
        assert!(canvas.pixels().all(|p| p[0] >= 250 && p[1] <= 5 && p[3] == 255));
    }
}
