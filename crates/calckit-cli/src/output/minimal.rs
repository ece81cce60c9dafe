use serde_json::Value;

/// Print just the key answer from the output.
///
/// Generated identifiers print one per line. Otherwise the first
/// well-known answer field is printed, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "total_periodic_payment",
        "periodic_payment",
        "principal_and_interest",
        "base_periodic_payment",
        "formatted",
        "is_valid",
    ];

    if let Value::Object(map) = result_obj {
        if let Some(Value::Array(ids)) = map.get("identifiers") {
            for id in ids {
                if let Some(formatted) = id.get("formatted") {
                    println!("{}", format_minimal(formatted));
                }
            }
            return;
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
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
