//! 粘贴事件与过滤
//!
//! # 设计思路
//!
//! 宿主上报的每个"文件创建"都是候选粘贴事件，但同步、批量导入等操作也会创建文件。
//! 这里只放行：普通文件 + 可识别的扩展名 + 创建时间在新鲜度阈值内。
//!
//! # 实现思路
//!
//! - 过滤是纯函数，处理时间由调用方传入，方便测试。
//! - 被过滤的事件返回 `SkipReason`，不视为错误。

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use crate::settings::Settings;
use crate::vault::{VaultEntry, VaultFile};

/// 创建时间早于处理时间超过该阈值的事件会被忽略
pub const FRESHNESS_THRESHOLD_MS: i64 = 1000;

/// 可识别的栅格图片扩展名
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// 动图格式，转码会丢帧，始终保留原编码
pub const ANIMATED_EXTENSIONS: &[&str] = &["gif"];

/// 待处理的粘贴事件
#[derive(Debug, Clone)]
pub struct PasteEvent {
    pub entry: VaultEntry,
    pub created_at: DateTime<Utc>,
}

impl PasteEvent {
    pub fn new(entry: VaultEntry, created_at: DateTime<Utc>) -> Self {
        Self { entry, created_at }
    }

    /// 文件取自身创建时间，目录取当前时间（目录随后会被过滤掉）
    pub fn from_entry(entry: VaultEntry) -> Self {
        let created_at = match &entry {
            VaultEntry::File(file) => file.ctime,
            VaultEntry::Folder(_) => Utc::now(),
        };
        Self { entry, created_at }
    }
}

/// 事件被忽略的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAFile,
    UnsupportedExtension(String),
    ExcludedExtension(String),
    Stale { age_ms: i64 },
}

/// 放行文件的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    /// 非图片附件，只重命名不转码
    Attachment,
}

pub fn is_image_extension(extension: &str) -> bool {
    let lower = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&lower.as_str())
}

pub fn is_animated_extension(extension: &str) -> bool {
    let lower = extension.to_ascii_lowercase();
    ANIMATED_EXTENSIONS.contains(&lower.as_str())
}

/// 判断事件是否需要处理
///
/// # 参数
/// * `event` - 创建事件
/// * `now` - 处理时间
/// * `settings` - 设置快照
/// * `exclude` - 已编译的排除扩展名正则
pub fn filter(
    event: &PasteEvent,
    now: DateTime<Utc>,
    settings: &Settings,
    exclude: Option<&Regex>,
) -> Result<(VaultFile, FileKind), SkipReason> {
    let file = match &event.entry {
        VaultEntry::File(file) => file,
        VaultEntry::Folder(_) => return Err(SkipReason::NotAFile),
    };

    let extension = file.extension();
    if let Some(pattern) = exclude {
        if pattern.is_match(extension) {
            return Err(SkipReason::ExcludedExtension(extension.to_string()));
        }
    }

    let kind = if is_image_extension(extension) {
        FileKind::Image
    } else if settings.handle_all_attachments && !extension.eq_ignore_ascii_case("md") {
        FileKind::Attachment
    } else {
        return Err(SkipReason::UnsupportedExtension(extension.to_string()));
    };

    let age = now.signed_duration_since(event.created_at);
    if age > TimeDelta::milliseconds(FRESHNESS_THRESHOLD_MS) {
        return Err(SkipReason::Stale {
            age_ms: age.num_milliseconds(),
        });
    }

    Ok((file.clone(), kind))
}
