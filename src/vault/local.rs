//! 本地目录文件库
//!
//! # 设计思路
//!
//! 用一个磁盘目录充当文件库，实现 [`Vault`] 全部能力。
//! 库内路径先规范化再拼到根目录下，`..` 无法逃出库根。
//!
//! # 实现思路
//!
//! - 所有 I/O 走 `tokio::fs`，不阻塞运行时。
//! - 创建时间取 `created()`，文件系统不支持时回退 `modified()`。
//! - `rename` 在目标已存在时直接报错，不覆盖。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;

use super::{path, Vault, VaultEntry, VaultFile, VaultFolder};
use crate::error::AppError;

/// 基于本地目录的文件库
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
    /// 宿主附件目录配置，语义见 [`path::resolve_attachment_folder`]
    attachment_folder: String,
}

impl LocalVault {
    /// 以 `root` 为库根创建文件库，附件默认存放在库根
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            attachment_folder: String::new(),
        }
    }

    pub fn with_attachment_folder(mut self, folder: impl Into<String>) -> Self {
        self.attachment_folder = folder.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, vault_path: &str) -> PathBuf {
        let normalized = path::normalize(vault_path);
        if normalized.is_empty() {
            return self.root.clone();
        }
        normalized
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// 读取库内文件的元数据，构造 [`VaultFile`]
    pub async fn file(&self, vault_path: &str) -> Result<VaultFile, AppError> {
        let absolute = self.absolute(vault_path);
        let metadata = fs::metadata(&absolute).await?;
        if !metadata.is_file() {
            return Err(AppError::Storage(format!("不是文件：{}", vault_path)));
        }
        Ok(VaultFile::new(vault_path, creation_time(&metadata)?))
    }

    /// 读取库内条目，不存在时返回 `None`
    pub async fn entry(&self, vault_path: &str) -> Result<Option<VaultEntry>, AppError> {
        let absolute = self.absolute(vault_path);
        let metadata = match fs::metadata(&absolute).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry = if metadata.is_dir() {
            VaultEntry::Folder(VaultFolder {
                path: path::normalize(vault_path),
            })
        } else {
            VaultEntry::File(VaultFile::new(vault_path, creation_time(&metadata)?))
        };
        Ok(Some(entry))
    }
}

fn creation_time(metadata: &std::fs::Metadata) -> Result<DateTime<Utc>, AppError> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(time))
}

#[async_trait]
impl Vault for LocalVault {
    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>, AppError> {
        Ok(fs::read(self.absolute(&file.path)).await?)
    }

    async fn modify_binary(&self, file: &VaultFile, data: Bytes) -> Result<(), AppError> {
        fs::write(self.absolute(&file.path), &data).await?;
        log::debug!("💾 已覆盖写入 {}（{} bytes）", file.path, data.len());
        Ok(())
    }

    async fn exists(&self, vault_path: &str) -> Result<bool, AppError> {
        Ok(fs::try_exists(self.absolute(vault_path)).await?)
    }

    async fn create_folder(&self, vault_path: &str) -> Result<(), AppError> {
        fs::create_dir_all(self.absolute(vault_path))
            .await
            .map_err(|e| AppError::Storage(format!("创建目录 '{}' 失败: {}", vault_path, e)))
    }

    async fn list(&self, dir: &str) -> Result<Vec<VaultEntry>, AppError> {
        let base = path::normalize(dir);
        let mut reader = fs::read_dir(self.absolute(&base)).await?;
        let mut entries = Vec::new();

        while let Some(item) = reader.next_entry().await? {
            let name = item.file_name().to_string_lossy().to_string();
            let vault_path = path::join(&base, &name);
            let metadata = item.metadata().await?;

            if metadata.is_dir() {
                entries.push(VaultEntry::Folder(VaultFolder { path: vault_path }));
            } else {
                entries.push(VaultEntry::File(VaultFile::new(
                    &vault_path,
                    creation_time(&metadata)?,
                )));
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }

    async fn rename(&self, file: &VaultFile, new_path: &str) -> Result<VaultFile, AppError> {
        let target = path::normalize(new_path);
        if target.is_empty() {
            return Err(AppError::Storage("目标路径为空".to_string()));
        }

        let destination = self.absolute(&target);
        if fs::try_exists(&destination).await? {
            return Err(AppError::Storage(format!("目标文件已存在：{}", target)));
        }

        fs::rename(self.absolute(&file.path), &destination)
            .await
            .map_err(|e| {
                AppError::Storage(format!("重命名 '{}' -> '{}' 失败: {}", file.path, target, e))
            })?;

        Ok(VaultFile::new(&target, file.ctime))
    }

    fn attachment_folder_for(&self, note: &VaultFile) -> String {
        path::resolve_attachment_folder(&self.attachment_folder, note.parent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn vault_with(files: &[&str]) -> (tempfile::TempDir, LocalVault) {
        let dir = tempfile::tempdir().expect("tempdir failed");
        for file in files {
            let absolute = dir.path().join(file);
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent).await.expect("mkdir failed");
            }
            fs::write(&absolute, b"x").await.expect("write failed");
        }
        let vault = LocalVault::new(dir.path());
        (dir, vault)
    }

    #[tokio::test]
    async fn list_returns_tagged_entries_sorted() {
        let (_dir, vault) = vault_with(&["b.png", "a.png", "sub/c.png"]).await;
        let entries = vault.list("").await.expect("list failed");
        let names: Vec<&str> = entries.iter().map(VaultEntry::name).collect();
        assert_eq!(names, vec!["a.png", "b.png", "sub"]);
        assert!(matches!(entries[2], VaultEntry::Folder(_)));
    }

    #[tokio::test]
    async fn rename_refuses_to_overwrite() {
        let (_dir, vault) = vault_with(&["a.png", "b.png"]).await;
        let file = vault.file("a.png").await.expect("file failed");
        let result = vault.rename(&file, "b.png").await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(vault.exists("a.png").await.expect("exists failed"));
    }

    #[tokio::test]
    async fn rename_moves_into_existing_folder() {
        let (_dir, vault) = vault_with(&["a.png"]).await;
        vault.create_folder("image").await.expect("mkdir failed");
        let file = vault.file("a.png").await.expect("file failed");

        let moved = vault.rename(&file, "image/b.jpeg").await.expect("rename failed");
        assert_eq!(moved.path, "image/b.jpeg");
        assert!(!vault.exists("a.png").await.expect("exists failed"));
        assert!(vault.exists("image/b.jpeg").await.expect("exists failed"));
    }

    #[tokio::test]
    async fn paths_cannot_escape_root() {
        let (dir, vault) = vault_with(&["a.png"]).await;
        assert_eq!(vault.absolute("../../etc/passwd"), dir.path().join("etc").join("passwd"));
    }

    #[tokio::test]
    async fn entry_reports_missing_as_none() {
        let (_dir, vault) = vault_with(&["a.png"]).await;
        assert!(vault.entry("missing.png").await.expect("entry failed").is_none());
        assert!(matches!(
            vault.entry("a.png").await.expect("entry failed"),
            Some(VaultEntry::File(_))
        ));
    }

    #[test]
    fn attachment_folder_relative_to_note() {
        let vault = LocalVault::new("/tmp/v").with_attachment_folder("./assets");
        let note = VaultFile::new("journal/day.md", Utc::now());
        assert_eq!(vault.attachment_folder_for(&note), "journal/assets");
    }
}
