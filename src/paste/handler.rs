//! # 粘贴编排模块
//!
//! ## 设计思路
//!
//! `PasteHandler` 驱动单次粘贴事件的完整状态机：
//!
//! ```text
//! Detected → Filtered → Named → DirectoryEnsured → Transcoded → Relinked → Renamed → Notified
//!     └──────────┴─────────┴───────────┴──────────────┴────────────┴──────────┴──→ Aborted
//! ```
//!
//! 任一阶段失败都在这里被捕获：向用户提示、记录日志、以 `Err` 返回给调用方，
//! 不会影响后续事件的处理。
//!
//! ## 实现思路
//!
//! - 设置通过 `Arc<RwLock<Settings>>` 支持运行时修改，单次事件使用同一份快照。
//! - 转码在内存中完成后才进入目录创建与重命名，转码失败时源文件保持原样。
//! - 转码与目录锁获取并行进行；"列目录 → 重命名" 在目录锁内串行。
//! - 已完成的重命名不会因为后续改写链接失败而回滚。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::event::{self, FileKind, PasteEvent, SkipReason};
use super::locks::DirectoryLocks;
use crate::error::AppError;
use crate::image_handler::{
    ImageError, ImageTranscoder, TargetFormat, TranscodeConfig, TranscodeResult,
};
use crate::naming::{self, CandidateName, DedupOptions, NameContext};
use crate::settings::Settings;
use crate::vault::{path, Vault, VaultEntry, VaultFile, Workspace};

/// 命名模板中 `{{imageNameKey}}` 对应的 frontmatter 键
pub const IMAGE_NAME_KEY: &str = "imageNameKey";

/// 单次粘贴事件所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteStage {
    Detected,
    Filtered,
    Named,
    DirectoryEnsured,
    Transcoded,
    Relinked,
    Renamed,
    Notified,
    Aborted,
}

impl PasteStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Filtered => "filtered",
            Self::Named => "named",
            Self::DirectoryEnsured => "directory_ensured",
            Self::Transcoded => "transcoded",
            Self::Relinked => "relinked",
            Self::Renamed => "renamed",
            Self::Notified => "notified",
            Self::Aborted => "aborted",
        }
    }
}

/// 一次成功重命名的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub original_name: String,
    /// 重命名后的文件
    pub file: VaultFile,
    /// 发生转码时的输出内容类型
    pub content_type: Option<String>,
    /// 光标所在行是否已改写为新链接
    pub relinked: bool,
}

/// 单次事件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    Skipped(SkipReason),
    /// 计算出的路径与当前路径相同，无需移动
    Unchanged(VaultFile),
    Renamed(RenameReport),
}

/// 粘贴处理器
pub struct PasteHandler<V, W> {
    vault: Arc<V>,
    workspace: Arc<W>,
    settings: Arc<RwLock<Settings>>,
    transcode_config: TranscodeConfig,
    locks: DirectoryLocks,
}

struct StageTracker {
    current: PasteStage,
}

impl StageTracker {
    fn advance(&mut self, next: PasteStage) {
        log::debug!("➡️ 粘贴阶段 {} -> {}", self.current.as_str(), next.as_str());
        self.current = next;
    }
}

impl<V: Vault, W: Workspace> PasteHandler<V, W> {
    /// 以初始设置创建处理器，设置无效时返回错误。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use paste_image_rename::paste::PasteHandler;
    /// use paste_image_rename::settings::Settings;
    /// use paste_image_rename::vault::LocalVault;
    ///
    /// let handler = PasteHandler::new(
    ///     Arc::new(LocalVault::new("/path/to/vault")),
    ///     Arc::new(my_workspace),
    ///     Settings::default(),
    /// )?;
    /// ```
    pub fn new(vault: Arc<V>, workspace: Arc<W>, settings: Settings) -> Result<Self, AppError> {
        settings.validate()?;
        Ok(Self {
            vault,
            workspace,
            settings: Arc::new(RwLock::new(settings)),
            transcode_config: TranscodeConfig::default(),
            locks: DirectoryLocks::new(),
        })
    }

    /// 替换转码基础配置（像素上限、滤镜）；设备像素比每次事件从工作区读取。
    pub fn with_transcode_config(mut self, config: TranscodeConfig) -> Self {
        self.transcode_config = config;
        self
    }

    pub fn vault(&self) -> &Arc<V> {
        &self.vault
    }

    pub fn workspace(&self) -> &Arc<W> {
        &self.workspace
    }

    /// 获取设置快照。
    pub fn settings_snapshot(&self) -> Result<Settings, AppError> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .map_err(|_| AppError::Settings("设置读取锁已中毒".to_string()))
    }

    /// 校验并替换设置，进行中的事件继续使用旧快照。
    pub fn update_settings(&self, settings: Settings) -> Result<(), AppError> {
        settings.validate()?;
        let mut current = self
            .settings
            .write()
            .map_err(|_| AppError::Settings("设置写入锁已中毒".to_string()))?;
        *current = settings;
        log::info!("⚙️ 设置已更新");
        Ok(())
    }

    /// 处理宿主上报的文件创建，以当前时间作为处理时间。
    pub async fn handle_created(&self, entry: VaultEntry) -> Result<PasteOutcome, AppError> {
        self.process(PasteEvent::from_entry(entry), Utc::now()).await
    }

    /// 处理一次粘贴事件。
    ///
    /// # 返回
    /// - `Ok(PasteOutcome::Skipped)`：事件被过滤
    /// - `Ok(PasteOutcome::Renamed)`：文件已重命名（可能已转码、已改写链接）
    /// - `Err(AppError)`：事件中止，已向用户提示
    pub async fn process(
        &self,
        event: PasteEvent,
        now: DateTime<Utc>,
    ) -> Result<PasteOutcome, AppError> {
        let mut stage = StageTracker {
            current: PasteStage::Detected,
        };
        let start = Instant::now();

        let result = self.run(event, now, &mut stage).await;
        match &result {
            Ok(PasteOutcome::Renamed(report)) => log::info!(
                "✅ 粘贴处理完成 - {} -> {} relinked={} total={}ms",
                report.original_name,
                report.file.path,
                report.relinked,
                start.elapsed().as_millis()
            ),
            Ok(PasteOutcome::Skipped(reason)) => log::debug!("⏭️ 忽略创建事件：{:?}", reason),
            Ok(PasteOutcome::Unchanged(file)) => log::debug!("⏭️ 文件名无需变更：{}", file.path),
            Err(err) => {
                log::error!("❌ 粘贴处理在 {} 阶段中止：{}", stage.current.as_str(), err);
                stage.advance(PasteStage::Aborted);
            }
        }
        result
    }

    async fn run(
        &self,
        event: PasteEvent,
        now: DateTime<Utc>,
        stage: &mut StageTracker,
    ) -> Result<PasteOutcome, AppError> {
        let settings = self.settings_snapshot()?;
        let exclude = settings.exclude_extension_regex()?;

        let (file, kind) = match event::filter(&event, now, &settings, exclude.as_ref()) {
            Ok(accepted) => accepted,
            Err(reason) => return Ok(PasteOutcome::Skipped(reason)),
        };
        stage.advance(PasteStage::Filtered);

        let note = self.require_active_file()?;

        let target_dir = if settings.auto_move {
            path::join(&self.vault.attachment_folder_for(&note), &settings.dirpath)
        } else {
            file.parent().to_string()
        };

        let convert = settings.png_to_jpeg
            && kind == FileKind::Image
            && !event::is_animated_extension(file.extension());
        let extension = if convert {
            TargetFormat::Jpeg.extension().to_string()
        } else {
            file.extension().to_string()
        };

        let (transcoded, guard) = tokio::join!(
            self.prepare_transcode(&file, convert, settings.quality),
            self.locks.acquire(&target_dir)
        );
        let transcoded = transcoded.inspect_err(|err| {
            self.workspace.notice(&format!("图片转码失败：{}", err));
        })?;

        let dir_exists = self.vault.exists(&target_dir).await?;
        let candidate = if settings.auto_rename {
            let ctx = NameContext::new(
                note.basename(),
                self.workspace.frontmatter_value(&note, IMAGE_NAME_KEY),
            );
            let stem = naming::candidate_stem(&settings, &ctx);
            let siblings = if dir_exists {
                self.sibling_names(&target_dir, &file).await?
            } else {
                Vec::new()
            };
            naming::deduplicate(
                &CandidateName::new(stem, extension),
                &siblings,
                &DedupOptions::from_settings(&settings),
            )
        } else {
            CandidateName::new(file.basename(), extension)
        };
        stage.advance(PasteStage::Named);

        if settings.auto_move && !dir_exists {
            self.vault.create_folder(&target_dir).await?;
            log::info!("📁 已创建附件目录：{}", target_dir);
        }
        stage.advance(PasteStage::DirectoryEnsured);

        let content_type = match transcoded {
            Some(result) => {
                self.vault.modify_binary(&file, result.bytes).await?;
                Some(result.content_type)
            }
            None => None,
        };
        stage.advance(PasteStage::Transcoded);

        let new_path = path::join(&target_dir, &candidate.file_name());
        if new_path == file.path {
            return Ok(PasteOutcome::Unchanged(file));
        }

        let original_name = file.name().to_string();
        let (renamed, old_link, new_link) = self.commit_rename(&file, &new_path, &note, stage).await?;
        drop(guard);

        let relinked = self.relink_cursor_line(&note, &old_link, &new_link)?;
        self.notify_renamed(&settings, &original_name, &renamed);
        stage.advance(PasteStage::Notified);

        Ok(PasteOutcome::Renamed(RenameReport {
            original_name,
            file: renamed,
            content_type,
            relinked,
        }))
    }

    /// 按新主干名重命名任意文件（保留所在目录与扩展名），并改写活动编辑器中的链接。
    pub async fn rename_file(
        &self,
        file: &VaultFile,
        new_stem: &str,
    ) -> Result<PasteOutcome, AppError> {
        let settings = self.settings_snapshot()?;
        let note = self.require_active_file()?;
        let mut stage = StageTracker {
            current: PasteStage::Filtered,
        };

        let target_dir = file.parent().to_string();
        let guard = self.locks.acquire(&target_dir).await;

        let stem = naming::sanitize_stem(new_stem, &settings.dup_number_delimiter);
        let siblings = self.sibling_names(&target_dir, file).await?;
        let candidate = naming::deduplicate(
            &CandidateName::new(stem, file.extension()),
            &siblings,
            &DedupOptions::from_settings(&settings),
        );
        stage.advance(PasteStage::Named);

        let new_path = path::join(&target_dir, &candidate.file_name());
        if new_path == file.path {
            return Ok(PasteOutcome::Unchanged(file.clone()));
        }

        let original_name = file.name().to_string();
        let (renamed, old_link, new_link) =
            self.commit_rename(file, &new_path, &note, &mut stage).await?;
        drop(guard);

        let relinked = self.relink_cursor_line(&note, &old_link, &new_link)?;
        self.notify_renamed(&settings, &original_name, &renamed);

        Ok(PasteOutcome::Renamed(RenameReport {
            original_name,
            file: renamed,
            content_type: None,
            relinked,
        }))
    }

    fn require_active_file(&self) -> Result<VaultFile, AppError> {
        self.workspace.active_file().ok_or_else(|| {
            let message = "没有活动文件，无法重命名附件";
            self.workspace.notice(message);
            AppError::Precondition(message.to_string())
        })
    }

    async fn prepare_transcode(
        &self,
        file: &VaultFile,
        convert: bool,
        quality: f32,
    ) -> Result<Option<TranscodeResult>, AppError> {
        if !convert {
            return Ok(None);
        }

        let source = self.vault.read_binary(file).await?;
        let transcoder = ImageTranscoder::new(
            self.transcode_config
                .clone()
                .with_device_pixel_ratio(self.workspace.device_pixel_ratio()),
        );
        let target_mime = TargetFormat::Jpeg.mime();

        let result = tokio::task::spawn_blocking(move || {
            transcoder.transcode(&source, quality, target_mime)
        })
        .await
        .map_err(|e| ImageError::Encode(format!("转码线程执行失败：{}", e)))?
        .inspect_err(|e| log::warn!("⚠️ {} 转码在 {} 阶段失败", file.path, e.stage()))?;

        Ok(Some(result))
    }

    /// 目标目录下除 `exclude` 外所有文件的文件名
    async fn sibling_names(&self, dir: &str, exclude: &VaultFile) -> Result<Vec<String>, AppError> {
        let entries = self.vault.list(dir).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry {
                VaultEntry::File(file) if file.path != exclude.path => Some(file.name().to_string()),
                VaultEntry::File(_) | VaultEntry::Folder(_) => None,
            })
            .collect())
    }

    /// 记录旧链接、执行重命名、生成新链接。
    ///
    /// 重命名失败时向用户提示错误详情并原样返回。
    async fn commit_rename(
        &self,
        file: &VaultFile,
        new_path: &str,
        note: &VaultFile,
        stage: &mut StageTracker,
    ) -> Result<(VaultFile, String, String), AppError> {
        let old_link = self.workspace.generate_link(file, &note.path);
        stage.advance(PasteStage::Relinked);

        let renamed = match self.vault.rename(file, new_path).await {
            Ok(renamed) => renamed,
            Err(err) => {
                self.workspace
                    .notice(&format!("重命名 {} 失败：{}", file.name(), err));
                return Err(err);
            }
        };
        stage.advance(PasteStage::Renamed);

        let new_link = self.workspace.generate_link(&renamed, &note.path);
        Ok((renamed, old_link, new_link))
    }

    /// 把光标所在行里的旧链接替换为新链接。
    ///
    /// 找不到对应编辑器时报错（重命名不回滚）；行内没有旧链接时视为软失败返回 `false`。
    fn relink_cursor_line(
        &self,
        note: &VaultFile,
        old_link: &str,
        new_link: &str,
    ) -> Result<bool, AppError> {
        let Some(line) = self.workspace.cursor_line(&note.path) else {
            let message = format!("未找到 {} 的活动编辑器，链接未更新", note.name());
            self.workspace.notice(&message);
            return Err(AppError::Precondition(message));
        };

        if old_link.is_empty() || !line.text.contains(old_link) {
            log::warn!(
                "⚠️ 光标所在行（第 {} 行）未找到旧链接 {}，保持不变",
                line.number + 1,
                old_link
            );
            return Ok(false);
        }

        let replaced = line.text.replacen(old_link, new_link, 1);
        self.workspace.replace_line(&note.path, line.number, &replaced)?;
        Ok(true)
    }

    fn notify_renamed(&self, settings: &Settings, original_name: &str, renamed: &VaultFile) {
        if settings.disable_rename_notice {
            return;
        }
        self.workspace
            .notice(&format!("已将 {} 重命名为 {}", original_name, renamed.name()));
    }
}
