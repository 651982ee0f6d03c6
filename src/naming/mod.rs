//! # 命名模块（naming）
//!
//! ## 设计思路
//!
//! 最终文件名由三步得出，每一步都是纯函数，便于单独测试：
//!
//! ```text
//! 命名模板 ──render──▶ 原始主干名 ──sanitize──▶ 候选名 ──deduplicate──▶ 最终名
//!            (template)               (sanitize)           (dedup + 目录快照)
//! ```
//!
//! - `template`：展开 `{{fileName}}` / `{{imageNameKey}}` / `{{DATE:FORMAT}}`
//! - `sanitize`：白名单清洗，空结果回退为分隔符
//! - `dedup`：按目录快照追加重复编号

pub mod dedup;
pub mod sanitize;
pub mod template;

pub use dedup::{deduplicate, CandidateName, DedupOptions};
pub use sanitize::sanitize_stem;
pub use template::{render, NameContext};

use crate::settings::Settings;

/// 渲染并清洗模板，得到不含扩展名的候选主干名
pub fn candidate_stem(settings: &Settings, ctx: &NameContext) -> String {
    let rendered = render(&settings.image_name_pattern, ctx);
    sanitize_stem(&rendered, &settings.dup_number_delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_stem_never_empty() {
        let settings = Settings {
            image_name_pattern: "{{unknown}}".to_string(),
            dup_number_delimiter: "_".to_string(),
            ..Settings::default()
        };
        let ctx = NameContext::new("note", None);
        assert_eq!(candidate_stem(&settings, &ctx), "_");
    }

    #[test]
    fn candidate_stem_renders_then_sanitizes() {
        let settings = Settings {
            image_name_pattern: "{{fileName}}: {{imageNameKey}}".to_string(),
            ..Settings::default()
        };
        let ctx = NameContext::new("hello", Some("cover/art".to_string()));
        assert_eq!(candidate_stem(&settings, &ctx), "hello coverart");
    }
}
