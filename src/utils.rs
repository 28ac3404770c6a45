//! Common utility functions

use anyhow::Result;

pub fn truncate_display(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Reject key segments that would not survive the `_`-joined key encoding.
pub fn ensure_key_segment(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("{} must not be empty", what);
    }
    if value.contains('_') {
        anyhow::bail!("{} must not contain underscores: {}", what, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("short", 10), "short");
        assert_eq!(truncate_display("魔王様の城", 2), "魔王...");
    }

    #[test]
    fn test_ensure_key_segment() {
        assert!(ensure_key_segment("domain", "kakuyomu").is_ok());
        assert!(ensure_key_segment("language", "zh-CN").is_ok());
        assert!(ensure_key_segment("domain", "my_site").is_err());
        assert!(ensure_key_segment("domain", "").is_err());
    }
}
