//! # 图片转码模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将"解码 → 尺寸校正 → 白底重绘 → 编码"按职责拆分为多个子模块：
//!
//! - `transcoder`：编排整条转码流水线 + 阶段耗时日志
//! - `pipeline`：解码、像素限制、缩放、白底居中绘制、编码
//! - `config/error/source`：配置、错误、结果模型
//!
//! ## 调用链
//!
//! ```text
//! 源字节
//!    ↓
//! transcoder.rs（参数解析 + 阶段计时）
//!    ├─ pipeline::decode（header 尺寸检查 + 完整解码）
//!    ├─ pipeline::corrected_dimensions（按设备像素比倒数缩放）
//!    ├─ pipeline::render_on_white（白底 + 居中绘制）
//!    └─ pipeline::encode（目标格式 + 质量）
//!    ↓
//! TranscodeResult（字节 + 内容类型）
//! ```

mod config;
mod error;
mod pipeline;
mod source;
mod transcoder;

pub use config::{TargetFormat, TranscodeConfig};
pub use error::ImageError;
pub use pipeline::corrected_dimensions;
pub use source::TranscodeResult;
pub use transcoder::ImageTranscoder;
