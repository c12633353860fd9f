use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static LEADING_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[a-zA-Z]*\s*").unwrap());

static TRAILING_FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Clean a raw model response down to bare SQL: strip reasoning tags some
/// local models emit, then any fenced-code markers wrapping the statement.
pub fn clean_sql_response(response: &str) -> String {
    let mut cleaned = THINK_TAG_PATTERN.replace_all(response, "").to_string();

    cleaned = cleaned.trim().to_string();
    cleaned = LEADING_FENCE_PATTERN.replace(&cleaned, "").to_string();
    cleaned = TRAILING_FENCE_PATTERN.replace(&cleaned, "").to_string();

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_sql_fence() {
        let input = "```sql\nSELECT * FROM users;\n```";
        assert_eq!(clean_sql_response(input), "SELECT * FROM users;");
    }

    #[test]
    fn test_strips_bare_fence() {
        let input = "```\nSELECT 1;\n```";
        assert_eq!(clean_sql_response(input), "SELECT 1;");
    }

    #[test]
    fn test_strips_think_tags() {
        let input = "<think>joins needed here</think>SELECT * FROM users;";
        assert_eq!(clean_sql_response(input), "SELECT * FROM users;");
    }

    #[test]
    fn test_preserves_plain_sql() {
        let input = "SELECT id\nFROM users";
        assert_eq!(clean_sql_response(input), "SELECT id\nFROM users");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(clean_sql_response("   \n "), "");
    }
}
