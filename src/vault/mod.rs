//! # 宿主能力模块（vault）
//!
//! ## 设计思路
//!
//! 笔记应用本身（文件库、编辑器、元数据缓存）是外部运行时，这里只定义
//! 粘贴链路真正用到的窄接口：
//!
//! - [`Vault`]：二进制读写、存在性检查、建目录、列目录、重命名、附件目录约定
//! - [`Workspace`]：活动文档、frontmatter、链接生成、光标行读写、提示、设备像素比
//!
//! 文件与目录用带标签的 [`VaultEntry`] 表示，调用侧穷举匹配，
//! 不再在每个调用点做运行时类型判断。
//!
//! ## 实现思路
//!
//! - `Vault` 的操作都会落到 I/O，使用 `async_trait` 以便 `dyn` 与泛型两用。
//! - `Workspace` 的编辑器操作在宿主侧是同步的，保持同步接口。
//! - [`LocalVault`] 基于 `tokio::fs` 实现 `Vault`，供本地目录与测试使用。

pub mod local;
pub mod path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::AppError;

pub use local::LocalVault;

/// 库内文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// 规范化后的库内路径
    pub path: String,
    /// 创建时间
    pub ctime: DateTime<Utc>,
}

impl VaultFile {
    pub fn new(path: &str, ctime: DateTime<Utc>) -> Self {
        Self {
            path: path::normalize(path),
            ctime,
        }
    }

    /// 含扩展名的文件名
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// 不含扩展名的文件名
    pub fn basename(&self) -> &str {
        path::split_name(self.name()).0
    }

    pub fn extension(&self) -> &str {
        path::split_name(self.name()).1
    }

    pub fn parent(&self) -> &str {
        path::parent(&self.path)
    }
}

/// 库内目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFolder {
    pub path: String,
}

impl VaultFolder {
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }
}

/// 库内条目：文件或目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEntry {
    File(VaultFile),
    Folder(VaultFolder),
}

impl VaultEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::File(file) => &file.path,
            Self::Folder(folder) => &folder.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Folder(folder) => folder.name(),
        }
    }
}

/// 编辑器中光标所在行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorLine {
    /// 从 0 开始的行号
    pub number: usize,
    pub text: String,
}

/// 宿主文件库能力
#[async_trait]
pub trait Vault: Send + Sync {
    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>, AppError>;

    /// 覆盖写入文件全部内容
    async fn modify_binary(&self, file: &VaultFile, data: Bytes) -> Result<(), AppError>;

    async fn exists(&self, path: &str) -> Result<bool, AppError>;

    async fn create_folder(&self, path: &str) -> Result<(), AppError>;

    /// 非递归列出目录下的条目
    async fn list(&self, dir: &str) -> Result<Vec<VaultEntry>, AppError>;

    /// 移动 / 重命名文件，目标已存在时返回错误
    async fn rename(&self, file: &VaultFile, new_path: &str) -> Result<VaultFile, AppError>;

    /// 宿主附件目录配置解析出的、给定笔记的附件目录
    fn attachment_folder_for(&self, note: &VaultFile) -> String;
}

/// 宿主工作区（编辑器 + 元数据）能力
pub trait Workspace: Send + Sync {
    /// 当前获得焦点的文档
    fn active_file(&self) -> Option<VaultFile>;

    /// 文档 frontmatter 中的字符串值
    fn frontmatter_value(&self, file: &VaultFile, key: &str) -> Option<String>;

    /// 按宿主配置（wikilink 或 markdown 链接）生成从 `source_path` 指向 `target` 的链接文本
    fn generate_link(&self, target: &VaultFile, source_path: &str) -> String;

    /// 显示 `source_path` 的活动编辑器中光标所在行，没有匹配的编辑器时返回 `None`
    fn cursor_line(&self, source_path: &str) -> Option<EditorLine>;

    /// 以单次事务替换整行文本
    fn replace_line(&self, source_path: &str, line: usize, text: &str) -> Result<(), AppError>;

    /// 向用户显示一条提示
    fn notice(&self, message: &str);

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}
