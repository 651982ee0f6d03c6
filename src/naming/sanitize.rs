//! 文件名清洗
//!
//! 只保留保守的可打印 ASCII 白名单字符，再去掉首尾空白。
//! 结果为空时回退为重复编号分隔符，保证最终文件名永不为空。

/// 白名单之外的标点会破坏 wikilink / markdown 链接或在部分文件系统上非法
const ALLOWED_PUNCTUATION: &[char] = &[
    ' ', '-', '_', '.', ',', '(', ')', '+', '=', '@', '&', '!', '\'', '~',
];

/// 判断单个字符是否允许出现在文件名中
pub fn is_allowed_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&ch)
}

/// 清洗候选文件名（不含扩展名）
///
/// # 参数
/// * `stem` - 模板渲染结果
/// * `delimiter` - 重复编号分隔符，清洗结果为空时作为兜底
pub fn sanitize_stem(stem: &str, delimiter: &str) -> String {
    let cleaned: String = stem.chars().filter(|c| is_allowed_char(*c)).collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() {
        log::debug!("🧹 文件名清洗后为空，回退为分隔符：{:?} -> {:?}", stem, delimiter);
        return delimiter.to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_illegal_characters() {
        assert_eq!(sanitize_stem("a/b\\c:d*e?f\"g<h>i|j", "-"), "abcdefghij");
        assert_eq!(sanitize_stem("note#1^[x]", "-"), "note1x");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize_stem("  hello world \t", "-"), "hello world");
    }

    #[test]
    fn empty_result_falls_back_to_delimiter() {
        assert_eq!(sanitize_stem("???", "-"), "-");
        assert_eq!(sanitize_stem("笔记", "_"), "_");
        assert_eq!(sanitize_stem("", "-"), "-");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        assert_eq!(sanitize_stem("a-b_c.d (1)", "-"), "a-b_c.d (1)");
    }
}
