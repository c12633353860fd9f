//! Deterministic SQL normalization.
//!
//! Re-indents a statement with one clause per line and uppercases keywords,
//! so stored corpus examples and generated SQL share one presentation. The
//! pass works on a whitespace-free token stream, which makes it idempotent:
//! formatting an already-formatted statement yields the same string.

use std::collections::HashSet;

use once_cell::sync::Lazy;

const INDENT: &str = "    ";

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "IS", "NULL", "LIKE", "ILIKE",
        "BETWEEN", "EXISTS", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "ON",
        "AS", "GROUP", "BY", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "INTERSECT", "EXCEPT",
        "ALL", "DISTINCT", "ASC", "DESC", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE",
        "RETURNING", "CASE", "WHEN", "THEN", "ELSE", "END", "WITH", "COUNT", "SUM", "AVG", "MIN",
        "MAX", "COALESCE", "CAST", "EXTRACT", "INTERVAL", "CURRENT_DATE", "CURRENT_TIMESTAMP",
        "NOW", "DATE_TRUNC", "TRUE", "FALSE",
    ]
    .into_iter()
    .collect()
});

/// Clause starters that begin a new line at the top nesting level.
static CLAUSE_STARTERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "FROM", "WHERE", "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "INTERSECT",
        "EXCEPT", "VALUES", "SET", "RETURNING", "JOIN",
    ]
    .into_iter()
    .collect()
});

/// JOIN modifiers break the line only when an actual JOIN follows.
static JOIN_MODIFIERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["INNER", "LEFT", "RIGHT", "FULL", "CROSS"].into_iter().collect());

/// Keywords that are function names; their argument list stays attached.
static FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "COUNT", "SUM", "AVG", "MIN", "MAX", "COALESCE", "CAST", "EXTRACT", "DATE_TRUNC", "NOW",
    ]
    .into_iter()
    .collect()
});

/// Normalize a SQL statement: collapse whitespace, uppercase keywords and
/// lay out one clause per line with a fixed four-space continuation indent.
pub fn format_sql(sql: &str) -> String {
    let tokens = tokenize(sql);
    if tokens.is_empty() {
        return String::new();
    }

    let upper: Vec<String> = tokens.iter().map(|t| canonical(t)).collect();

    let mut out = String::new();
    let mut depth: i32 = 0;
    let mut line_start = true;

    for (i, token) in upper.iter().enumerate() {
        let breaks = depth == 0 && i > 0 && starts_clause(&upper, i);
        let continues = depth == 0 && i > 0 && matches!(token.as_str(), "AND" | "OR");

        if breaks {
            out.push('\n');
            line_start = true;
        } else if continues {
            out.push('\n');
            out.push_str(INDENT);
            line_start = true;
        }

        if !line_start && needs_space(&upper, i) {
            out.push(' ');
        }
        out.push_str(token);
        line_start = false;

        match token.as_str() {
            "(" => depth += 1,
            ")" => depth = (depth - 1).max(0),
            _ => {}
        }
    }

    out
}

fn starts_clause(tokens: &[String], i: usize) -> bool {
    let token = tokens[i].as_str();
    let prev = tokens.get(i.wrapping_sub(1)).map(String::as_str);
    if CLAUSE_STARTERS.contains(token) {
        // GROUP/ORDER only open a clause when followed by BY.
        if token == "GROUP" || token == "ORDER" {
            return tokens.get(i + 1).map(String::as_str) == Some("BY");
        }
        // A JOIN preceded by its modifier already broke at the modifier.
        if token == "JOIN" {
            return !matches!(prev, Some(p) if JOIN_MODIFIERS.contains(p) || p == "OUTER");
        }
        return true;
    }
    if JOIN_MODIFIERS.contains(token) {
        let next = tokens.get(i + 1).map(String::as_str);
        let after = tokens.get(i + 2).map(String::as_str);
        return next == Some("JOIN") || (next == Some("OUTER") && after == Some("JOIN"));
    }
    // A SELECT after UNION/INTERSECT/EXCEPT sits on its own line.
    if token == "SELECT" {
        return matches!(
            prev,
            Some("UNION") | Some("INTERSECT") | Some("EXCEPT") | Some("ALL")
        );
    }
    false
}

fn needs_space(tokens: &[String], i: usize) -> bool {
    let token = tokens[i].as_str();
    if matches!(token, "," | ";" | ")") {
        return false;
    }
    let prev = tokens[i - 1].as_str();
    if prev == "(" {
        return false;
    }
    if token == "(" {
        // Function calls keep their argument list attached; operators and
        // non-function keywords keep a space before the parenthesis.
        if !is_word(prev) {
            return true;
        }
        return KEYWORDS.contains(prev) && !FUNCTIONS.contains(prev);
    }
    true
}

fn canonical(token: &str) -> String {
    if is_word(token) && KEYWORDS.contains(token.to_uppercase().as_str()) {
        token.to_uppercase()
    } else {
        token.to_string()
    }
}

fn is_word(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a statement into tokens, preserving quoted strings and quoted
/// identifiers verbatim. Parentheses, commas and semicolons become their
/// own tokens; `--` line comments are dropped (the layout that anchors
/// them does not survive re-indentation); everything else splits on
/// whitespace.
fn tokenize(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                flush(&mut tokens, &mut current);
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut literal = String::new();
                literal.push(quote);
                while let Some(&next) = chars.peek() {
                    literal.push(next);
                    chars.next();
                    if next == quote {
                        // Doubled quote is an escape, keep consuming.
                        if chars.peek() == Some(&quote) {
                            literal.push(quote);
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
                flush(&mut tokens, &mut current);
                tokens.push(literal);
            }
            '(' | ')' | ',' | ';' => {
                flush(&mut tokens, &mut current);
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            c => current.push(c),
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercases_keywords() {
        let formatted = format_sql("select id from users");
        assert_eq!(formatted, "SELECT id\nFROM users");
    }

    #[test]
    fn test_clause_per_line() {
        let formatted = format_sql(
            "select name, email from users where active = true order by name limit 10",
        );
        assert_eq!(
            formatted,
            "SELECT name, email\nFROM users\nWHERE active = TRUE\nORDER BY name\nLIMIT 10"
        );
    }

    #[test]
    fn test_and_gets_continuation_indent() {
        let formatted = format_sql("select * from t where a = 1 and b = 2");
        assert_eq!(
            formatted,
            "SELECT *\nFROM t\nWHERE a = 1\n    AND b = 2"
        );
    }

    #[test]
    fn test_join_breaks_line() {
        let formatted = format_sql(
            "select u.name from users u left join orders o on o.user_id = u.id",
        );
        assert_eq!(
            formatted,
            "SELECT u.name\nFROM users u\nLEFT JOIN orders o ON o.user_id = u.id"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = format_sql("select count(*) from orders where total > 100 and status = 'paid'");
        let twice = format_sql(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_string_literals() {
        let formatted = format_sql("select * from t where name = 'select from where'");
        assert!(formatted.contains("'select from where'"));
    }

    #[test]
    fn test_function_call_has_no_space_before_parens() {
        let formatted = format_sql("select count(*) from users");
        assert_eq!(formatted, "SELECT COUNT(*)\nFROM users");
    }

    #[test]
    fn test_no_break_inside_subquery() {
        let formatted =
            format_sql("select * from t where id in (select user_id from orders where total > 5)");
        assert_eq!(
            formatted,
            "SELECT *\nFROM t\nWHERE id IN (SELECT user_id FROM orders WHERE total > 5)"
        );
    }

    #[test]
    fn test_line_comment_is_dropped() {
        let formatted = format_sql("SELECT * FROM t -- only from t\nWHERE x = 1");
        assert_eq!(formatted, "SELECT *\nFROM t\nWHERE x = 1");
    }

    #[test]
    fn test_trailing_comment_is_dropped() {
        assert_eq!(format_sql("SELECT 1; -- all done"), "SELECT 1;");
    }

    #[test]
    fn test_comment_inside_string_is_preserved() {
        let formatted = format_sql("SELECT * FROM t WHERE note = 'a -- b'");
        assert!(formatted.contains("'a -- b'"));
    }

    #[test]
    fn test_commented_sql_is_idempotent() {
        let once = format_sql("SELECT id -- primary key\nFROM users -- main table\nWHERE id = 1");
        assert_eq!(once, format_sql(&once));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_sql(""), "");
        assert_eq!(format_sql("   \n  "), "");
    }
}
