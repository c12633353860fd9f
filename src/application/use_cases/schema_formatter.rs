//! Compact textual schema descriptions for prompting.

use std::fmt::Write;

use serde_json::Value;

use crate::infrastructure::db::Row;

/// One table from the introspection query: name plus `name type` column
/// definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTable {
    pub table_name: String,
    pub columns: Vec<String>,
}

/// Render tables as `Table:` / `Columns:` blocks. Empty input yields an
/// empty string.
pub fn format(tables: &[SchemaTable]) -> String {
    let mut out = String::new();
    for table in tables {
        writeln!(out, "Table: {}", table.table_name).unwrap();
        writeln!(out, "Columns: {}", table.columns.join(", ")).unwrap();
    }
    out
}

/// Convert generic database rows (`table_name` text, `columns` text array)
/// into `SchemaTable` values. Rows missing either field are skipped.
pub fn tables_from_rows(rows: &[Row]) -> Vec<SchemaTable> {
    rows.iter()
        .filter_map(|row| {
            let table_name = row.get("table_name")?.as_str()?.to_string();
            let columns = match row.get("columns")? {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => return None,
            };
            Some(SchemaTable { table_name, columns })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_format_single_table() {
        let tables = vec![SchemaTable {
            table_name: "users".to_string(),
            columns: vec!["id int".to_string(), "name text".to_string()],
        }];
        let text = format(&tables);
        assert!(text.contains("Table: users"));
        assert!(text.contains("Columns: id int, name text"));
    }

    #[test]
    fn test_format_empty_input() {
        assert_eq!(format(&[]), "");
    }

    #[test]
    fn test_tables_from_rows() {
        let mut row: Row = HashMap::new();
        row.insert("table_name".to_string(), json!("orders"));
        row.insert("columns".to_string(), json!(["id integer", "total numeric"]));

        let tables = tables_from_rows(&[row]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table_name, "orders");
        assert_eq!(tables[0].columns, vec!["id integer", "total numeric"]);
    }

    #[test]
    fn test_tables_from_rows_skips_malformed() {
        let mut row: Row = HashMap::new();
        row.insert("table_name".to_string(), json!("orders"));
        assert!(tables_from_rows(&[row]).is_empty());
    }
}
