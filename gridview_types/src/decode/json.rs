//! Embedded JSON documents.
//!
//! Only the top level of an object becomes columns; a nested object is
//! reported as not decoded. Arrays become heterogeneous lists.

use serde_json::{Number, Value as JsonValue};

use crate::{Column, ColumnList, DecodeError, TypeTag, Value};

/// Break an embedded JSON document into columns.
///
/// An object yields one column per key, sorted by key. Any other document
/// yields one unnamed column.
///
/// # Errors
///
/// [`DecodeError::NotDecoded`] when `raw` is not valid JSON.
pub fn decode_json(raw: &str) -> Result<ColumnList, DecodeError> {
    let doc: JsonValue = serde_json::from_str(raw)
        .map_err(|e| DecodeError::not_decoded(format!("invalid embedded JSON: {e}")))?;
    Ok(match doc {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(key, value)| field_column(key, value))
            .collect::<ColumnList>()
            .sorted_by_name(),
        other => ColumnList::from(vec![element_column(String::new(), other)]),
    })
}

fn field_column(name: String, value: JsonValue) -> Column {
    match value {
        JsonValue::Object(_) => Column::not_decoded(name),
        other => element_column(name, other),
    }
}

fn element_column(name: String, value: JsonValue) -> Column {
    match value {
        JsonValue::Null => Column::nil(name),
        JsonValue::Bool(b) => Column::new(name, TypeTag::Bool, b),
        JsonValue::Number(n) => number_column(name, &n),
        JsonValue::String(s) => Column::new(name, TypeTag::String, s),
        JsonValue::Array(items) => {
            let list = items
                .into_iter()
                .map(|item| element_column(String::new(), item))
                .collect();
            Column::new(name, TypeTag::JavaArray, Value::List(list))
        }
        obj @ JsonValue::Object(_) => Column::new(name, TypeTag::Json, Value::Json(obj.to_string())),
    }
}

fn number_column(name: String, n: &Number) -> Column {
    if let Some(i) = n.as_i64() {
        return Column::new(name, TypeTag::Int64, i);
    }
    match n.as_f64() {
        Some(f) => Column::new(name, TypeTag::Float64, f),
        None => Column::not_decoded(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::NOT_DECODED;
    use serde_json::json;

    fn texts(cols: &ColumnList) -> Vec<(String, String)> {
        cols.iter().map(|c| (c.name.clone(), c.text())).collect()
    }

    #[test]
    fn test_object_sorted_by_key() {
        let cols = decode_json(r#"{"zip": null, "age": 3, "ok": true, "ratio": 0.5}"#).unwrap();
        assert_eq!(
            texts(&cols),
            vec![
                ("age".into(), "3".into()),
                ("ok".into(), "true".into()),
                ("ratio".into(), "0.5".into()),
                ("zip".into(), "-".into()),
            ]
        );
    }

    #[test]
    fn test_nested_object_is_not_decoded() {
        let cols = decode_json(r#"{"inner": {"a": 1}, "x": "y"}"#).unwrap();
        assert_eq!(cols[0].tag, TypeTag::NotDecoded);
        assert_eq!(cols[0].text(), NOT_DECODED);
        assert_eq!(cols[1].text(), "y");
    }

    #[test]
    fn test_array_becomes_list() {
        let cols = decode_json(r#"{"xs": [1, "two", null, {"k": 3}]}"#).unwrap();
        assert_eq!(cols[0].tag, TypeTag::JavaArray);
        assert_eq!(cols[0].text(), r#"[1, two, -, {"k":3}]"#);
        assert_eq!(cols[0].to_json(), Ok(json!([1, "two", null, {"k": 3}])));
    }

    #[test]
    fn test_non_object_root() {
        let cols = decode_json("[1, 2]").unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].name, "");
        assert_eq!(cols[0].text(), "[1, 2]");

        let cols = decode_json("\"hi\"").unwrap();
        assert_eq!(texts(&cols), vec![(String::new(), "hi".into())]);
    }

    #[test]
    fn test_large_numbers_fall_back_to_float() {
        let cols = decode_json(r#"{"big": 18446744073709551615}"#).unwrap();
        assert_eq!(cols[0].tag, TypeTag::Float64);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(decode_json("{"), Err(DecodeError::NotDecoded(_))));
    }
}
