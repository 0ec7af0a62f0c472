//! JSON array-of-objects import/export.

use crate::error::{Result, WellTabError};
use serde_json::{Map, Value};
use welltab_engine::engine::{Column, Table, parse_number};

/// Build a table from `[{...}, {...}]`.
///
/// Headers are the keys of the first object, in key order. Keys missing from
/// later objects give empty cells; extra keys are ignored.
pub fn parse_json(text: &str) -> Result<Table> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| WellTabError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(WellTabError::InvalidJson("expected an array of objects".into()));
    };
    let Some(first) = items.first() else {
        return Err(WellTabError::InvalidJson("the array is empty".into()));
    };
    let Value::Object(first) = first else {
        return Err(WellTabError::InvalidJson("array items must be objects".into()));
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    if headers.is_empty() {
        return Err(WellTabError::NoColumns);
    }
    let mut table = Table::with_columns(headers.iter().map(Column::inferred).collect());

    for item in &items {
        let row = match item {
            Value::Object(obj) => headers
                .iter()
                .map(|key| obj.get(key).map(value_text).unwrap_or_default())
                .collect(),
            other => {
                tracing::warn!(value = %other, "Skipping non-object JSON array item");
                continue;
            }
        };
        table.push_row(row);
    }
    Ok(table)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Object keys for the headers. A repeated header gets a `_2`, `_3`, ...
/// suffix so no column is lost.
fn object_keys(table: &Table) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(table.column_count());
    for header in table.headers() {
        let mut key = header.to_string();
        let mut n = 1;
        while keys.contains(&key) {
            n += 1;
            key = format!("{}_{}", header, n);
        }
        if n > 1 {
            tracing::warn!(header, key = %key, "Renamed repeated header in JSON export");
        }
        keys.push(key);
    }
    keys
}

fn cell_value(text: &str) -> Value {
    if let Ok(n) = text.trim().parse::<i64>() {
        return Value::Number(n.into());
    }
    parse_number(text)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Rows as objects keyed by header; numeric-looking cells become numbers,
/// whole numbers staying integers.
pub fn to_json_value(table: &Table) -> Value {
    let keys = object_keys(table);
    let rows = (0..table.row_count())
        .map(|row| {
            let obj: Map<String, Value> = keys
                .iter()
                .enumerate()
                .map(|(col, key)| (key.clone(), cell_value(table.cell(row, col))))
                .collect();
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

pub fn to_json_string(table: &Table) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(table))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_uses_first_object_keys() {
        let t = parse_json(r#"[{"p": 30, "t": "0"}, {"t": "1"}, {"p": null, "t": 2, "x": 9}]"#)
            .unwrap();
        assert_eq!(t.headers().collect::<Vec<_>>(), vec!["p", "t"]);
        assert_eq!(t.row_texts(0), vec!["30", "0"]);
        assert_eq!(t.row_texts(1), vec!["", "1"]);
        assert_eq!(t.row_texts(2), vec!["", "2"]);
    }

    #[test]
    fn test_parse_json_rejects_bad_shapes() {
        assert!(matches!(parse_json("{}"), Err(WellTabError::InvalidJson(_))));
        assert!(matches!(parse_json("[]"), Err(WellTabError::InvalidJson(_))));
        assert!(matches!(parse_json("[1, 2]"), Err(WellTabError::InvalidJson(_))));
        assert!(matches!(parse_json("not json"), Err(WellTabError::InvalidJson(_))));
    }

    #[test]
    fn test_export_retypes_numbers() {
        let t = Table::from_rows(["t", "note"], [vec!["1.5", "open"], vec!["", "2"]]);
        assert_eq!(
            to_json_value(&t),
            json!([{"t": 1.5, "note": "open"}, {"t": "", "note": 2}])
        );
    }

    #[test]
    fn test_export_keeps_integers() {
        let t = Table::from_rows(["n", "p"], [vec!["0", "-12"], vec!["3.0", "1e3"]]);
        let value = to_json_value(&t);
        assert!(value[0]["n"].is_i64());
        assert_eq!(value[0]["n"], json!(0));
        assert_eq!(value[0]["p"], json!(-12));
        assert!(value[1]["n"].is_f64());
        assert_eq!(value[1]["p"], json!(1000.0));
        assert_eq!(to_json_string(&t).unwrap().matches("\"n\": 0,").count(), 1);
    }

    #[test]
    fn test_export_repeated_headers() {
        let t = Table::from_rows(["p", "p", "p_2", "p"], [vec!["1", "2", "3", "4"]]);
        assert_eq!(
            to_json_value(&t),
            json!([{"p": 1, "p_2": 2, "p_2_2": 3, "p_3": 4}])
        );
    }
}
