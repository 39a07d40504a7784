use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
///
/// In JSON mode the members of `data` (when it is an object) are merged next to `message`.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&success_body(message, data))?),
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str) {
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": false, "error": message })),
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
}

fn success_body(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({
        "success": true,
        "message": message
    });

    if let (Some(Value::Object(extra)), Value::Object(body)) = (data, &mut response) {
        body.extend(extra);
    }
    response
}
