//! JSON Schema validation for configuration documents.
//!
//! The analysis configuration schema is embedded at compile time from
//! `schemas/analysis-config.json` (JSON Schema Draft 7).
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use popstat::validation::validate_analysis_config;
//!
//! let config = json!({ "year_range": { "start": 1960, "end": 2023 } });
//! assert!(validate_analysis_config(&config).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static ANALYSIS_CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/analysis-config.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON document against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the embedded analysis configuration schema.
pub fn validate_analysis_config(data: &Value) -> Result<(), Vec<String>> {
    validate(&ANALYSIS_CONFIG_SCHEMA, data)
}
