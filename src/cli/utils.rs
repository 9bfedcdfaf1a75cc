use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. Object `data` is
/// merged into the JSON body.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_body(message, data))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
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
    let mut body = json!({
        "success": true,
        "message": message
    });

    if let (Some(target), Some(Value::Object(extra))) = (body.as_object_mut(), data) {
        target.extend(extra);
    }
    body
}
