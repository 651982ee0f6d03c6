//! 命名模板渲染
//!
//! # 设计思路
//!
//! 用户模板形如 `{{fileName}}-{{DATE:YYYYMMDDHHmmss}}`，占位符由上下文解析。
//! 无法解析的占位符一律渲染为空串而不是报错，模板拼写错误不应阻断重命名。
//! 本模块不做文件名清洗，清洗由 [`super::sanitize`] 负责。
//!
//! # 实现思路
//!
//! - 占位符正则通过 `once_cell::sync::Lazy` 预编译。
//! - 日期格式沿用笔记应用用户熟悉的 `YYYY/MM/DD/HH/mm/ss` 写法，
//!   渲染前逐个记号翻译成 chrono 的 strftime 格式。
//! - 支持的记号：`YYYY YY MMMM MMM MM M Do DD D dddd ddd d HH H hh h mm m ss s SSS A a X`，
//!   `[...]` 内为字面量，其余字符原样输出。`Do` 依赖具体日期，翻译时直接写成字面量。

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Local};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `{{name}}` 或 `{{name:FORMAT}}`
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([^{}:]+?)\s*(?::([^{}]*))?\}\}").expect("placeholder regex is valid")
});

/// `{{DATE}}` 未给出格式时使用
pub const DEFAULT_DATE_FORMAT: &str = "YYYYMMDDHHmmss";

/// 模板渲染上下文
#[derive(Debug, Clone)]
pub struct NameContext {
    /// 活动文档的文件名（不含扩展名）
    pub file_name: String,
    /// 活动文档 frontmatter 中 `imageNameKey` 的值
    pub image_name_key: Option<String>,
    pub now: DateTime<Local>,
}

impl NameContext {
    pub fn new(file_name: impl Into<String>, image_name_key: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            image_name_key,
            now: Local::now(),
        }
    }
}

/// 按上下文展开模板，未知占位符渲染为空串
///
/// # 示例
/// ```rust
/// use paste_image_rename::naming::{render, NameContext};
///
/// let ctx = NameContext::new("note", None);
/// assert_eq!(render("{{missing}}-{{fileName}}", &ctx), "-note");
/// ```
pub fn render(pattern: &str, ctx: &NameContext) -> String {
    PLACEHOLDER
        .replace_all(pattern, |caps: &Captures| {
            let name = &caps[1];
            let format = caps.get(2).map(|m| m.as_str());
            resolve(name, format, ctx)
        })
        .into_owned()
}

fn resolve(name: &str, format: Option<&str>, ctx: &NameContext) -> String {
    match name {
        "fileName" => ctx.file_name.clone(),
        "imageNameKey" => ctx.image_name_key.clone().unwrap_or_default(),
        "DATE" => {
            let format = format
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .unwrap_or(DEFAULT_DATE_FORMAT);
            format_date(&ctx.now, format)
        }
        other => {
            log::debug!("🔤 未知占位符 {{{{{}}}}}，按空串处理", other);
            String::new()
        }
    }
}

fn format_date(now: &DateTime<Local>, format: &str) -> String {
    let strftime = moment_to_strftime(format, now.day());
    let items: Vec<Item<'_>> = StrftimeItems::new(&strftime).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        log::warn!("⚠️ 日期格式无法解析：{}", format);
        return String::new();
    }
    now.format_with_items(items.iter()).to_string()
}

/// 长记号在前，保证 `YYYY` 不会被拆成两个 `YY`
const DATE_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("d", "%w"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSS", "%3f"),
    ("A", "%p"),
    ("a", "%P"),
    ("X", "%s"),
];

/// 把 `YYYY-MM-DD` 风格的日期格式翻译为 strftime 格式。
///
/// `[...]` 内为原样输出的字面量，未识别的字符同样原样输出。
/// `day` 用于展开带序数后缀的 `Do`。
pub(crate) fn moment_to_strftime(format: &str, day: u32) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut out, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if let Some(stripped) = rest.strip_prefix("Do") {
            push_literal(&mut out, &ordinal(day));
            rest = stripped;
            continue;
        }

        for (token, spec) in DATE_TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = stripped;
                continue 'outer;
            }
        }

        push_literal(&mut out, &rest[..ch.len_utf8()]);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// 1st / 2nd / 3rd / 4th，11~13 一律 th
fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

fn push_literal(out: &mut String, literal: &str) {
    for ch in literal.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}
