//! 重名消解
//!
//! # 设计思路
//!
//! 给定候选文件名与目标目录的一次列表快照，计算一个不与快照冲突的最终名字：
//! 没有冲突时原样返回；有冲突时在已有编号的最大值上加一。
//! 编号只增不复用，前提是之前带编号的兄弟文件仍在列表中。
//!
//! # 实现思路
//!
//! - 兄弟文件只比较主干名（去掉扩展名），`a.png` 与候选 `a.jpeg` 同样视为冲突。
//! - 编号按位置匹配 `stem + delimiter + digits`（后缀）或 `digits + delimiter + stem`（前缀）。
//! - 列表是时间点快照，不是事务保证；并发粘贴由编排器按目录加锁串行化。

use std::collections::HashSet;

use crate::settings::{DupNumberPosition, Settings};
use crate::vault::path::split_name;

/// 候选文件名：主干 + 扩展名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    pub stem: String,
    /// 不含点号，可为空
    pub extension: String,
}

impl CandidateName {
    pub fn new(stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.stem.clone()
        } else {
            format!("{}.{}", self.stem, self.extension)
        }
    }
}

/// 重名消解参数，来自设置快照
#[derive(Debug, Clone)]
pub struct DedupOptions {
    pub delimiter: String,
    pub position: DupNumberPosition,
    /// 没有冲突也追加编号
    pub always: bool,
}

impl DedupOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delimiter: settings.dup_number_delimiter.clone(),
            position: settings.dup_number_position,
            always: settings.dup_number_always,
        }
    }

    fn compose(&self, stem: &str, number: u128) -> String {
        match self.position {
            DupNumberPosition::Suffix => format!("{}{}{}", stem, self.delimiter, number),
            DupNumberPosition::Prefix => format!("{}{}{}", number, self.delimiter, stem),
        }
    }

    fn parse_number(&self, stem: &str, sibling_stem: &str) -> Option<u64> {
        let digits = match self.position {
            DupNumberPosition::Suffix => sibling_stem
                .strip_prefix(stem)?
                .strip_prefix(self.delimiter.as_str())?,
            DupNumberPosition::Prefix => sibling_stem
                .strip_suffix(stem)?
                .strip_suffix(self.delimiter.as_str())?,
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// 计算不与兄弟文件冲突的最终文件名
///
/// # 参数
/// * `candidate` - 清洗后的候选名
/// * `siblings` - 目标目录下现有条目的完整文件名
/// * `options` - 分隔符、编号位置、是否总是编号
///
/// # 示例
/// ```rust
/// use paste_image_rename::naming::{deduplicate, CandidateName, DedupOptions};
/// use paste_image_rename::settings::DupNumberPosition;
///
/// let options = DedupOptions {
///     delimiter: "-".to_string(),
///     position: DupNumberPosition::Suffix,
///     always: false,
/// };
/// let siblings = ["a.png", "a-1.png", "a-2.jpeg"];
/// let name = deduplicate(&CandidateName::new("a", "jpeg"), &siblings, &options);
/// assert_eq!(name.file_name(), "a-3.jpeg");
/// ```
pub fn deduplicate<S: AsRef<str>>(
    candidate: &CandidateName,
    siblings: &[S],
    options: &DedupOptions,
) -> CandidateName {
    let stem = candidate.stem.as_str();
    let mut exists = false;
    let mut max_number: Option<u64> = None;
    let mut taken: HashSet<&str> = HashSet::with_capacity(siblings.len());

    for sibling in siblings {
        let (sibling_stem, _) = split_name(sibling.as_ref());
        taken.insert(sibling_stem);

        if sibling_stem == stem {
            exists = true;
        }
        if let Some(number) = options.parse_number(stem, sibling_stem) {
            max_number = Some(max_number.map_or(number, |m| m.max(number)));
        }
    }

    if !exists && !options.always {
        return candidate.clone();
    }

    let mut number = max_number.map_or(1, |m| u128::from(m) + 1);
    let mut final_stem = options.compose(stem, number);
    // 超出 u64 的编号不会被收集，这里兜底避免撞上这类兄弟文件
    while taken.contains(final_stem.as_str()) {
        number += 1;
        final_stem = options.compose(stem, number);
    }

    log::debug!(
        "🔢 重名消解：{} -> {}（冲突={}, 最大编号={:?}）",
        stem,
        final_stem,
        exists,
        max_number
    );

    CandidateName::new(final_stem, candidate.extension.clone())
}
