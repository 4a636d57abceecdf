//! Typed parameter values.

use serde::{Deserialize, Serialize};

use crate::entity::parametre;
use crate::error::{AppError, AppResult};

/// Declared type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    Json,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "integer" | "int" => Some(Self::Integer),
            "float" | "decimal" => Some(Self::Float),
            "boolean" | "bool" => Some(Self::Boolean),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Check `value` against the type and return its canonical stored form.
    pub fn normalize(&self, value: &str) -> AppResult<String> {
        let trimmed = value.trim();
        match self {
            Self::String => Ok(value.to_string()),
            Self::Integer => trimmed
                .parse::<i64>()
                .map(|v| v.to_string())
                .map_err(|_| AppError::InvalidInput(format!("Entier attendu: {}", value))),
            Self::Float => trimmed
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.to_string())
                .ok_or_else(|| AppError::InvalidInput(format!("Nombre attendu: {}", value))),
            Self::Boolean => parse_bool(trimmed)
                .map(|b| b.to_string())
                .ok_or_else(|| AppError::InvalidInput(format!("Booléen attendu: {}", value))),
            Self::Json => serde_json::from_str::<serde_json::Value>(trimmed)
                .map(|v| v.to_string())
                .map_err(|e| AppError::InvalidInput(format!("JSON invalide: {}", e))),
        }
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" | "oui" => Some(true),
        "0" | "false" | "off" | "no" | "non" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateParametreRequest {
    pub valeur: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParametreGroup {
    pub groupe: String,
    pub parametres: Vec<parametre::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(ParamType::Integer.normalize(" 42 ").unwrap(), "42");
        assert!(ParamType::Integer.normalize("4.2").is_err());
        assert_eq!(ParamType::Float.normalize("3,5").unwrap(), "3.5");
        assert_eq!(ParamType::Boolean.normalize("oui").unwrap(), "true");
        assert!(ParamType::Boolean.normalize("peut-être").is_err());
        assert_eq!(ParamType::Json.normalize(r#"{ "a": 1 }"#).unwrap(), r#"{"a":1}"#);
        assert!(ParamType::Json.normalize("{").is_err());
    }
}
