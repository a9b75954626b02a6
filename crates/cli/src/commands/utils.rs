use anyhow::{Context, Result};
use serde_json::Value;

pub fn print_success(message: &str) {
    println!("[SUCCESS] {message}");
}

pub fn print_info(message: &str) {
    println!("[INFO] {message}");
}

/// Parses `--variables`; absent means no variables.
pub fn parse_variables(raw: Option<&str>) -> Result<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(raw).context("--variables must be valid JSON")?;
    anyhow::ensure!(value.is_object(), "--variables must be a JSON object");
    Ok(Some(value))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables_absent() {
        assert!(parse_variables(None).unwrap().is_none());
    }

    #[test]
    fn test_parse_variables_object() {
        let value = parse_variables(Some(r#"{"owner":"0xabc","first":5}"#)).unwrap().unwrap();
        assert_eq!(value["first"], 5);
    }

    #[test]
    fn test_parse_variables_rejects_non_object() {
        assert!(parse_variables(Some("[1,2]")).is_err());
        assert!(parse_variables(Some("{ nope")).is_err());
    }
}
