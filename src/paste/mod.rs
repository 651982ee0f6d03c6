//! # 粘贴处理模块（paste）
//!
//! ## 设计思路
//!
//! 把宿主的"文件创建"通知转成一条显式的异步处理链路：
//!
//! ```text
//! 宿主创建事件 ──mpsc──▶ listener（订阅 + 每事件一个任务）
//!                          ↓
//!                       handler（状态机编排）
//!                          ├─ event（类型 / 扩展名 / 新鲜度过滤）
//!                          ├─ naming（模板 → 清洗 → 重名消解）
//!                          ├─ image_handler（内存中转码）
//!                          ├─ locks（同目录串行）
//!                          └─ vault / workspace（移动、改写链接、提示）
//! ```

pub mod event;
pub mod handler;
pub mod listener;
pub mod locks;

pub use event::{FileKind, PasteEvent, SkipReason, FRESHNESS_THRESHOLD_MS};
pub use handler::{PasteHandler, PasteOutcome, PasteStage, RenameReport};
pub use listener::{subscribe, PasteSubscription};
