use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the object.
pub fn print_minimal(value: &Value) {
    // Priority list of key output fields
    let priority_keys = [
        "greenscore",
        "co2_kg_total",
        "final_confidence",
        "net_value_usd",
        "recommendation",
        "total_value",
        "percentile",
    ];

    if let Value::Object(map) = value {
        // Try priority keys first (skip nulls and nested structures)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() && !val.is_object() && !val.is_array() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // A pipeline result nests the score one level down
        if let Some(Value::Object(greenscore)) = map.get("greenscore") {
            if let Some(score) = greenscore.get("greenscore") {
                println!("{}", format_minimal(score));
                return;
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    if let Value::Array(arr) = value {
        // A credit list reduces to its net values
        let values: Vec<String> = arr
            .iter()
            .map(|item| {
                item.get("net_value_usd")
                    .map(format_minimal)
                    .unwrap_or_else(|| format_minimal(item))
            })
            .collect();
        println!("{}", values.join(", "));
        return;
    }

    println!("{}", format_minimal(value));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
