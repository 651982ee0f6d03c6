//! 创建事件订阅
//!
//! # 设计思路
//!
//! 宿主把"文件创建"通过通道推送进来，`subscribe` 注册处理器并返回一个可释放的订阅句柄。
//! 每个事件在独立任务中处理：宿主可能在极短时间内连续创建多个文件，
//! 某个事件失败只记录日志，不影响后续事件。
//!
//! # 实现思路
//!
//! - 后台任务循环 `recv`，通道关闭或订阅释放时退出。
//! - `PasteSubscription` 在 `dispose` 或 `Drop` 时中止接收任务；已开始处理的事件会继续跑完。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::handler::{PasteHandler, PasteOutcome};
use crate::vault::{Vault, VaultEntry, Workspace};

/// 事件订阅句柄
#[derive(Debug)]
pub struct PasteSubscription {
    task: Option<JoinHandle<()>>,
}

impl PasteSubscription {
    /// 停止接收新的创建事件
    pub fn dispose(mut self) {
        self.abort();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("🔌 已取消粘贴事件订阅");
        }
    }
}

impl Drop for PasteSubscription {
    fn drop(&mut self) {
        self.abort();
    }
}

/// 在当前 tokio 运行时上订阅创建事件
///
/// # 参数
/// * `handler` - 共享的粘贴处理器
/// * `events` - 宿主推送文件创建的通道
pub fn subscribe<V, W>(
    handler: Arc<PasteHandler<V, W>>,
    mut events: mpsc::Receiver<VaultEntry>,
) -> PasteSubscription
where
    V: Vault + 'static,
    W: Workspace + 'static,
{
    let task = tokio::spawn(async move {
        while let Some(entry) = events.recv().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let path = entry.path().to_string();
                match handler.handle_created(entry).await {
                    Ok(PasteOutcome::Renamed(report)) => {
                        log::debug!("📋 事件完成：{} -> {}", path, report.file.path);
                    }
                    Ok(_) => {}
                    Err(err) => log::warn!("⚠️ 创建事件 {} 处理失败：{}", path, err),
                }
            });
        }
        log::debug!("📭 创建事件通道已关闭");
    });

    PasteSubscription { task: Some(task) }
}
