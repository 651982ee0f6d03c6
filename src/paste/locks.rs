//! 按目标目录串行化
//!
//! "列目录 → 计算不重名的名字 → 重命名" 之间存在检查与使用的时间差，
//! 两个粘贴同时落到同一目录时可能算出同一个名字。
//! 每个目标目录持有一把异步互斥锁，同目录的这段流程依次执行，不同目录互不影响。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct DirectoryLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl DirectoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取目录锁，guard 释放前同目录的其它调用会等待
    pub async fn acquire(&self, dir: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // 只剩表内引用的锁已无人持有或等待
            map.retain(|key, lock| key == dir || Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(dir.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
