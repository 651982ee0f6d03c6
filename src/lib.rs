//! # 粘贴图片重命名库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主笔记应用（外部运行时）                 │
//! │                                                          │
//! │  文件库 ── 编辑器 ── 元数据缓存 ── 设置存储               │
//! │     │ 创建事件 (mpsc)        ↑ Vault / Workspace trait    │
//! └─────┼────────────────────────┼───────────────────────────┘
//!       ↓                        │
//! ┌─────┼────────────────────────┼───────────────────────────┐
//! │     ↓            本库 (Rust) │                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  ├─ settings ─── 设置快照 + 校验 + JSON 读写              │
//! │  ├─ paste ────── 订阅 + 状态机编排 + 目录锁               │
//! │  │   └─ event        类型 / 扩展名 / 新鲜度过滤           │
//! │  ├─ naming ───── 模板渲染 → 清洗 → 重名消解               │
//! │  ├─ image_handler  解码 → 白底重绘 → JPEG 编码            │
//! │  └─ vault ────── 宿主能力 trait + LocalVault (tokio::fs)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，编排器所有入口的返回类型 |
//! | [`settings`] | 设置快照、默认值、取值校验、JSON 持久化 |
//! | [`naming`] | 命名模板展开、文件名清洗、按目录快照追加重复编号 |
//! | [`image_handler`] | 图片解码、设备像素比校正、白底居中重绘、按质量编码 |
//! | [`vault`] | 宿主文件库 / 工作区接口、库内路径工具、本地目录实现 |
//! | [`paste`] | 创建事件过滤、粘贴状态机、同目录串行、事件订阅 |

pub mod error;
pub mod image_handler;
pub mod naming;
pub mod paste;
pub mod settings;
pub mod vault;
