//! 插件设置模块
//!
//! # 设计思路
//!
//! 设置由宿主的键值存储持久化，字段名沿用宿主侧的 camelCase 约定。
//! 编排器在每次事件开始时取一份快照，之后所有组件只接收快照或其中字段，
//! 避免处理中途配置漂移。
//!
//! # 实现思路
//!
//! - `#[serde(default)]` 保证旧版本记录缺字段时也能加载。
//! - `validate` 集中校验取值范围，读取与写入前都会调用。
//! - `load_from_path` / `save_to_path` 以格式化 JSON 读写，文件不存在时回退默认值。

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::naming::sanitize::is_allowed_char;

/// 重复编号放在文件名的哪一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DupNumberPosition {
    /// `3-name`
    Prefix,
    /// `name-3`
    Suffix,
}

/// 插件设置快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 命名模板，支持 `{{fileName}}`、`{{imageNameKey}}`、`{{DATE:FORMAT}}`
    pub image_name_pattern: String,
    pub dup_number_position: DupNumberPosition,
    pub dup_number_delimiter: String,
    /// 即使没有重名也追加编号
    pub dup_number_always: bool,
    pub auto_rename: bool,
    /// 自动移动到附件目录下的 `dirpath`
    pub auto_move: bool,
    /// 转码为 JPEG
    pub png_to_jpeg: bool,
    /// JPEG 质量，取值 (0, 1]
    pub quality: f32,
    /// 附件目录下的子路径
    pub dirpath: String,
    /// 非图片附件也参与重命名（不转码）
    pub handle_all_attachments: bool,
    /// 匹配此正则的扩展名不处理，空串表示不排除
    pub exclude_extension_pattern: String,
    pub disable_rename_notice: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_name_pattern: "{{fileName}}".to_string(),
            dup_number_position: DupNumberPosition::Suffix,
            dup_number_delimiter: "-".to_string(),
            dup_number_always: false,
            auto_rename: true,
            auto_move: true,
            png_to_jpeg: true,
            quality: 0.6,
            dirpath: "image/".to_string(),
            handle_all_attachments: false,
            exclude_extension_pattern: String::new(),
            disable_rename_notice: false,
        }
    }
}

impl Settings {
    /// 校验设置取值。
    ///
    /// # 返回
    /// - `Ok(())`：设置可用
    /// - `Err(AppError::Settings)`：任一字段越界或格式非法
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(AppError::Settings(format!(
                "quality 必须在 (0, 1] 之间，当前为 {}",
                self.quality
            )));
        }

        if self.dup_number_delimiter.is_empty() {
            return Err(AppError::Settings("重复编号分隔符不能为空".to_string()));
        }
        if let Some(bad) = self
            .dup_number_delimiter
            .chars()
            .find(|c| !is_allowed_char(*c))
        {
            return Err(AppError::Settings(format!(
                "重复编号分隔符包含非法字符：{:?}",
                bad
            )));
        }

        if !self.exclude_extension_pattern.is_empty() {
            Regex::new(&self.exclude_extension_pattern).map_err(|e| {
                AppError::Settings(format!("排除扩展名正则无效：{}", e))
            })?;
        }

        Ok(())
    }

    /// 编译排除扩展名正则，未配置时返回 `None`。
    pub(crate) fn exclude_extension_regex(&self) -> Result<Option<Regex>, AppError> {
        if self.exclude_extension_pattern.is_empty() {
            return Ok(None);
        }
        Regex::new(&self.exclude_extension_pattern)
            .map(Some)
            .map_err(|e| AppError::Settings(format!("排除扩展名正则无效：{}", e)))
    }
}

/// 从 JSON 文件读取设置，文件不存在时返回默认值
pub fn load_from_path(path: &Path) -> Result<Settings, AppError> {
    if !path.exists() {
        log::debug!("⚙️ 设置文件不存在，使用默认设置: {}", path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<Settings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;
    settings.validate()?;
    Ok(settings)
}

/// 校验后以格式化 JSON 写入设置文件
pub fn save_to_path(path: &Path, settings: &Settings) -> Result<(), AppError> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}
