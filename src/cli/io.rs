//! JSON output for the CLI
//!
//! Every command prints exactly one JSON object on stdout:
//! - success: `{"status":"ok","data":...}`
//! - failure: `{"status":"error","code":...,"message":...}`

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

pub fn ok_envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Writes one envelope followed by a newline
pub fn write_envelope<W: Write>(writer: &mut W, envelope: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, envelope)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_envelope(&mut io::stdout().lock(), &ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_envelope(&mut io::stdout().lock(), &error_envelope(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_is_single_line() {
        let mut buf = Vec::new();
        write_envelope(&mut buf, &ok_envelope(json!({"a": [1, 2]}))).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["a"][1], 2);
    }

    #[test]
    fn test_error_envelope_fields() {
        let v = error_envelope("JSONDB_NOT_FOUND", "missing");
        assert_eq!(v["status"], "error");
        assert_eq!(v["code"], "JSONDB_NOT_FOUND");
        assert_eq!(v["message"], "missing");
    }
}
