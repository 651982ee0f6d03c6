//! 库内路径工具
//!
//! 库内路径统一使用 `/` 分隔、相对库根、无首尾斜杠，库根本身为空串。
//! `..` 超出库根的部分直接丢弃，保证任何路径都落在库内。

/// 规范化库内路径
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// 拼接两段库内路径
pub fn join(base: &str, child: &str) -> String {
    normalize(&format!("{}/{}", base, child))
}

/// 父目录路径，位于库根时返回空串
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(head, _)| head)
}

/// 路径最后一段
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, tail)| tail)
}

/// 拆分为主干名与扩展名（扩展名不含点号）。
///
/// 以点号开头且没有其它点号的名字（如 `.hidden`）视为没有扩展名。
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx + 1..]),
        _ => (name, ""),
    }
}

/// 按笔记应用的附件目录约定解析目标目录
///
/// - 空串或 `/`：库根
/// - `./` 或 `./sub`：笔记所在目录（或其子目录）
/// - 其它：库内固定路径
pub fn resolve_attachment_folder(setting: &str, note_parent: &str) -> String {
    let setting = setting.trim();
    if setting.is_empty() || setting == "/" {
        return String::new();
    }
    if setting == "." {
        return normalize(note_parent);
    }
    if let Some(relative) = setting.strip_prefix("./") {
        return join(note_parent, relative);
    }
    normalize(setting)
}
