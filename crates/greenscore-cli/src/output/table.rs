use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Scalar fields render as field/value rows; string lists (explainers,
/// actions, next_steps) render as bulleted sections below the table;
/// arrays of objects (credit lists, pool participants) render as one
/// table with a column per key.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(_) => print_object(value),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_object(value: &Value) {
    let Value::Object(map) = value else { return };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut list_sections: Vec<(&str, &Vec<Value>)> = Vec::new();
    let mut nested: Vec<(&str, &Value)> = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.iter().all(|v| v.is_string()) && !arr.is_empty() => {
                list_sections.push((key.as_str(), arr));
            }
            Value::Array(arr) if arr.iter().all(|v| v.is_object()) && !arr.is_empty() => {
                nested.push((key.as_str(), val));
                builder.push_record([key.as_str(), &format!("({} entries)", arr.len())]);
            }
            Value::Object(_) => {
                nested.push((key.as_str(), val));
                builder.push_record([key.as_str(), "(see below)"]);
            }
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }

    let table = Table::from(builder);
    println!("{}", table);

    for (key, items) in list_sections {
        println!("\n{}:", key);
        for item in items {
            if let Value::String(s) = item {
                println!("  - {}", s);
            }
        }
    }

    for (key, val) in nested {
        println!("\n{}:", key);
        match val {
            Value::Array(arr) => print_array_table(arr),
            Value::Object(inner) => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (k, v) in inner {
                    builder.push_record([k.as_str(), &format_value(v)]);
                }
                println!("{}", Table::from(builder));
            }
            _ => {}
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
