//! Mapping between Terraform values and vTM `properties` documents

use serde_json::{Map, Value};
use std::collections::HashMap;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use super::{Column, Field, FieldKind, ObjectKind, CONTENT_ATTRIBUTE};
use crate::error::{Error, Result};

/// Which attributes of a read object end up in state
#[derive(Clone, Copy)]
pub enum StateMode<'a> {
    /// Every field (data sources)
    All,
    /// Fields that are set or unknown in the given plan/state, plus fields
    /// with a default (resources)
    Tracked(&'a DynamicValue),
}

/// Build a partial `properties` document from the known attribute values
/// of `state`. Null and unknown values are left out.
pub fn properties_from_state(fields: &[Field], state: &DynamicValue) -> Result<Map<String, Value>> {
    let mut properties = Map::new();

    for field in fields {
        let name = field.attribute_name();
        let Some(value) = state.get(&AttributePath::new(&name)) else {
            continue;
        };
        if !value.is_known() {
            continue;
        }

        let json = value_to_json(&name, value, field.kind)?;
        let section = properties
            .entry(field.section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = section {
            section.insert(field.key.to_string(), json);
        }
    }

    Ok(properties)
}

/// Build state for object `name` from the `properties` returned by the service
pub fn state_from_properties(
    kind: &ObjectKind,
    name: &str,
    properties: &Map<String, Value>,
    mode: StateMode<'_>,
) -> Result<DynamicValue> {
    let mut state = identity(name)?;

    for field in kind.fields() {
        let path = AttributePath::new(&field.attribute_name());
        let remote = properties
            .get(field.section)
            .and_then(|section| section.get(field.key))
            .map(|v| value_from_json(v, field.kind));

        let value = match mode {
            StateMode::All => remote.unwrap_or(Dynamic::Null),
            StateMode::Tracked(template) => match template.get(&path) {
                Some(tracked) if !tracked.is_null() => match remote {
                    Some(remote) if !remote.is_null() => remote,
                    // Keep the written value when the service omits it
                    _ if tracked.is_known() => tracked.clone(),
                    _ => Dynamic::Null,
                },
                _ if field.default.is_some() => remote.unwrap_or(Dynamic::Null),
                _ => Dynamic::Null,
            },
        };
        state.set(&path, value)?;
    }

    Ok(state)
}

/// State for a raw (text) object
pub fn state_from_content(name: &str, content: &str) -> Result<DynamicValue> {
    let mut state = identity(name)?;
    state.set_string(&AttributePath::new(CONTENT_ATTRIBUTE), content)?;
    Ok(state)
}

fn identity(name: &str) -> Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_string(&AttributePath::new("id"), name)?;
    state.set_string(&AttributePath::new("name"), name)?;
    Ok(state)
}

fn value_to_json(attribute: &str, value: &Dynamic, kind: FieldKind) -> Result<Value> {
    let mismatch = || Error::invalid_config(attribute, format!("expected {:?} value", kind));

    match kind {
        FieldKind::String => value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Int => {
            let n = value.as_number().ok_or_else(mismatch)?;
            if n.fract() != 0.0 {
                return Err(Error::invalid_config(
                    attribute,
                    format!("{} is not a whole number", n),
                ));
            }
            // i64::MAX rounds up to 2^63 as f64, which is already out of range
            if n < i64::MIN as f64 || n >= i64::MAX as f64 {
                return Err(Error::invalid_config(
                    attribute,
                    format!("{} is out of range for an integer", n),
                ));
            }
            Ok(Value::from(n as i64))
        }
        FieldKind::Number => value
            .as_number()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(mismatch),
        FieldKind::Bool => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
        FieldKind::StringList => {
            let items = value.as_list().ok_or_else(mismatch)?;
            items
                .iter()
                .filter(|item| item.is_known())
                .map(|item| value_to_json(attribute, item, FieldKind::String))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        FieldKind::Table(columns) => {
            let rows = value.as_list().ok_or_else(mismatch)?;
            rows.iter()
                .map(|row| row_to_json(attribute, row, columns))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn row_to_json(attribute: &str, row: &Dynamic, columns: &[Column]) -> Result<Value> {
    let cells = row
        .as_map()
        .ok_or_else(|| Error::invalid_config(attribute, "table rows must be objects"))?;

    let mut object = Map::new();
    for column in columns {
        if let Some(cell) = cells.get(column.name).filter(|cell| cell.is_known()) {
            let path = format!("{}.{}", attribute, column.name);
            object.insert(column.name.to_string(), value_to_json(&path, cell, column.kind)?);
        }
    }
    Ok(Value::Object(object))
}

/// Convert a property value to a Terraform value of the field's type.
/// Table rows keep exactly the declared columns.
pub fn value_from_json(value: &Value, kind: FieldKind) -> Dynamic {
    match (kind, value) {
        (FieldKind::Table(columns), Value::Array(rows)) => Dynamic::List(
            rows.iter()
                .map(|row| {
                    let cells: HashMap<String, Dynamic> = columns
                        .iter()
                        .map(|column| {
                            let cell = row
                                .get(column.name)
                                .map(|v| value_from_json(v, column.kind))
                                .unwrap_or(Dynamic::Null);
                            (column.name.to_string(), cell)
                        })
                        .collect();
                    Dynamic::Map(cells)
                })
                .collect(),
        ),
        (FieldKind::StringList, Value::Array(items)) => Dynamic::List(
            items
                .iter()
                .map(|item| value_from_json(item, FieldKind::String))
                .collect(),
        ),
        (FieldKind::String, Value::Number(n)) => Dynamic::String(n.to_string()),
        _ => Dynamic::from_json(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::find;
    use serde_json::json;

    fn pool_properties() -> Map<String, Value> {
        json!({
            "basic": {
                "monitors": ["Ping"],
                "nodes_table": [
                    {"node": "10.0.0.1:80", "priority": 1, "state": "active", "weight": 1, "source_ip": ""}
                ],
                "note": "",
                "passive_monitoring": true,
                "max_connection_attempts": 0,
                "node_connection_attempts": 3,
                "failure_pool": "",
                "persistence_class": ""
            },
            "load_balancing": {"algorithm": "least_connections", "priority_enabled": false},
            "connection": {"max_connect_time": 4, "max_reply_time": 30},
            "http": {"keepalive": true},
            "tcp": {"nagle": true}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn only_known_values_are_written() {
        let pool = find("pool").unwrap();
        let mut state = DynamicValue::object();
        state.set_string(&AttributePath::new("name"), "web").unwrap();
        state
            .set_list(
                &AttributePath::new("monitors"),
                vec![Dynamic::String("Ping".into())],
            )
            .unwrap();
        state
            .set_string(&AttributePath::new("load_balancing_algorithm"), "random")
            .unwrap();
        state
            .set_number(&AttributePath::new("connection_max_reply_time"), 60.0)
            .unwrap();
        state.mark_unknown(&AttributePath::new("note")).unwrap();
        state
            .set(&AttributePath::new("failure_pool"), Dynamic::Null)
            .unwrap();

        let properties = properties_from_state(pool.fields(), &state).unwrap();
        assert_eq!(
            Value::Object(properties),
            json!({
                "basic": {"monitors": ["Ping"]},
                "load_balancing": {"algorithm": "random"},
                "connection": {"max_reply_time": 60}
            })
        );
    }

    #[test]
    fn table_rows_keep_known_columns() {
        let pool = find("pool").unwrap();
        let mut row = HashMap::new();
        row.insert("node".to_string(), Dynamic::String("10.0.0.1:80".into()));
        row.insert("weight".to_string(), Dynamic::Number(2.0));
        row.insert("state".to_string(), Dynamic::Null);
        let mut state = DynamicValue::object();
        state
            .set_list(&AttributePath::new("nodes_table"), vec![Dynamic::Map(row)])
            .unwrap();

        let properties = properties_from_state(pool.fields(), &state).unwrap();
        assert_eq!(
            properties["basic"]["nodes_table"],
            json!([{"node": "10.0.0.1:80", "weight": 2}])
        );
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let pool = find("pool").unwrap();
        let mut state = DynamicValue::object();
        state
            .set_number(&AttributePath::new("node_connection_attempts"), 2.5)
            .unwrap();

        let err = properties_from_state(pool.fields(), &state).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfig);
        assert!(err.to_string().starts_with("node_connection_attempts"));
    }

    #[test]
    fn out_of_range_integer_is_rejected() {
        let pool = find("pool").unwrap();
        let mut state = DynamicValue::object();
        state
            .set_number(&AttributePath::new("node_connection_attempts"), 1e300)
            .unwrap();

        let err = properties_from_state(pool.fields(), &state).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("out of range"));

        state
            .set_number(&AttributePath::new("node_connection_attempts"), -1e19)
            .unwrap();
        assert!(properties_from_state(pool.fields(), &state).is_err());
    }

    #[test]
    fn all_mode_fills_every_field() {
        let pool = find("pool").unwrap();
        let state =
            state_from_properties(pool, "web", &pool_properties(), StateMode::All).unwrap();

        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "web");
        assert_eq!(
            state
                .get_string(&AttributePath::new("load_balancing_algorithm"))
                .unwrap(),
            "least_connections"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("failure_pool")).unwrap(),
            ""
        );
        let row = state
            .get_map(&AttributePath::new("nodes_table").index(0))
            .unwrap();
        assert_eq!(row.len(), 4);
        assert!(!row.contains_key("source_ip"));
        assert_eq!(row["priority"], Dynamic::Number(1.0));
    }

    #[test]
    fn tracked_mode_keeps_unset_optional_fields_null() {
        let pool = find("pool").unwrap();
        let mut planned = DynamicValue::object();
        planned.set_string(&AttributePath::new("name"), "web").unwrap();
        planned.mark_unknown(&AttributePath::new("id")).unwrap();
        planned
            .set(&AttributePath::new("failure_pool"), Dynamic::Null)
            .unwrap();

        let state = state_from_properties(
            pool,
            "web",
            &pool_properties(),
            StateMode::Tracked(&planned),
        )
        .unwrap();

        // no default, not configured
        assert!(state
            .get(&AttributePath::new("failure_pool"))
            .unwrap()
            .is_null());
        // defaulted fields follow the service
        assert_eq!(
            state
                .get_string(&AttributePath::new("load_balancing_algorithm"))
                .unwrap(),
            "least_connections"
        );
        assert_eq!(
            state.get_number(&AttributePath::new("connection_max_connect_time")).unwrap(),
            4.0
        );
    }

    #[test]
    fn tracked_value_missing_from_response_is_kept() {
        let pool = find("pool").unwrap();
        let mut planned = DynamicValue::object();
        planned
            .set_string(&AttributePath::new("persistence_class"), "sticky")
            .unwrap();

        let state =
            state_from_properties(pool, "web", &Map::new(), StateMode::Tracked(&planned)).unwrap();
        assert_eq!(
            state
                .get_string(&AttributePath::new("persistence_class"))
                .unwrap(),
            "sticky"
        );
    }

    #[test]
    fn raw_state() {
        let state = state_from_content("redirect", "http.redirect(\"/\");").unwrap();
        assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "redirect");
        assert_eq!(
            state.get_string(&AttributePath::new(CONTENT_ATTRIBUTE)).unwrap(),
            "http.redirect(\"/\");"
        );
    }
}
