//! Declarative parameter validation.
//!
//! Every operation that takes caller input declares a [`Schema`]. The
//! pipeline runs [`validate`] on the operation's parameters before any rate
//! limit slot is taken or any request is sent, so malformed input never
//! reaches the network.
//!
//! Parameters are given as a JSON object, which lets any serializable
//! parameter struct be checked. Unknown keys are ignored and `null` counts as
//! absent. A successful validation yields the query parameters for the
//! request, in schema order.

use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::constants::MSG_MISSING_API_KEY;
use super::error::{ApiError, Violation};

/// Shape constraint on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Any string.
    String,
    /// A string with at least one character.
    NonEmptyString,
    /// A non-empty string, with a custom message when empty.
    Required(&'static str),
    /// A well-formed absolute URL.
    Url,
    /// A number greater than zero.
    Positive,
    /// A number greater than or equal to zero.
    NonNegative,
    /// `true` or `false`.
    Boolean,
    /// Either a string or a number.
    StringOrNumber,
    /// A non-empty list of non-empty strings, sent comma-joined.
    CodeList,
}

/// A named field and its constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key in the parameter object and in the query string.
    pub name: &'static str,
    /// Constraint the value must satisfy.
    pub rule: Rule,
    /// Whether the field must be present.
    pub required: bool,
}

impl Field {
    /// A field that must be present.
    #[must_use]
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: true,
        }
    }

    /// A field that may be absent or `null`.
    #[must_use]
    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: false,
        }
    }
}

/// Declared shape of an operation's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Schema name, for logs.
    pub name: &'static str,
    /// Fields in query-string order.
    pub fields: &'static [Field],
}

/// Query parameters produced by validation, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Looks up the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts a parameter object without checking it.
    ///
    /// Scalars become query values, arrays are comma-joined, and `null` or
    /// nested objects are skipped.
    #[must_use]
    pub fn from_object(data: &Value) -> Self {
        let mut params = Self::new();
        if let Some(object) = data.as_object() {
            for (key, value) in object {
                if let Some(rendered) = render(value) {
                    params.push(key.clone(), rendered);
                }
            }
        }
        params
    }
}

/// Client configuration: API key required, everything else optional.
pub const CONFIG: Schema = Schema {
    name: "config",
    fields: &[
        Field::required("api_key", Rule::Required(MSG_MISSING_API_KEY)),
        Field::optional("base_url", Rule::Url),
        Field::optional("timeout", Rule::Positive),
        Field::optional("retry_attempts", Rule::Positive),
        Field::optional("retry_delay", Rule::Positive),
    ],
};

/// File listing filters.
pub const FILE_LIST: Schema = Schema {
    name: "file_list",
    fields: &[
        Field::optional("page", Rule::Positive),
        Field::optional("per_page", Rule::Positive),
        Field::optional("fld_id", Rule::NonNegative),
        Field::optional("created", Rule::StringOrNumber),
        Field::optional("name", Rule::String),
        Field::optional("preview", Rule::Boolean),
    ],
};

/// Deleted-file and DMCA listing filters.
pub const DMCA_LIST: Schema = Schema {
    name: "dmca_list",
    fields: &[
        Field::optional("page", Rule::Positive),
        Field::optional("per_page", Rule::Positive),
        Field::optional("last", Rule::Positive),
        Field::optional("pending", Rule::Boolean),
    ],
};

/// Premium key generation.
pub const PREMIUM_KEY: Schema = Schema {
    name: "premium_key",
    fields: &[
        Field::required("days", Rule::Positive),
        Field::required("amount", Rule::Positive),
    ],
};

/// Remote (URL) upload.
pub const REMOTE_UPLOAD: Schema = Schema {
    name: "remote_upload",
    fields: &[
        Field::required("url", Rule::Url),
        Field::optional("folder_id", Rule::NonNegative),
    ],
};

/// One or more file codes.
pub const FILE_CODES: Schema = Schema {
    name: "file_codes",
    fields: &[Field::required("file_code", Rule::CodeList)],
};

/// One or more file codes to delete.
pub const DELETE_CODES: Schema = Schema {
    name: "delete_codes",
    fields: &[Field::required("del_code", Rule::CodeList)],
};

/// Clone a file, optionally into a folder.
pub const FILE_CLONE: Schema = Schema {
    name: "file_clone",
    fields: &[
        Field::required("file_code", Rule::NonEmptyString),
        Field::optional("fld_id", Rule::NonNegative),
    ],
};

/// Rename a file.
pub const FILE_RENAME: Schema = Schema {
    name: "file_rename",
    fields: &[
        Field::required("file_code", Rule::NonEmptyString),
        Field::required("title", Rule::String),
    ],
};

/// Move a file into a folder.
pub const FILE_SET_FOLDER: Schema = Schema {
    name: "file_set_folder",
    fields: &[
        Field::required("file_code", Rule::NonEmptyString),
        Field::required("fld_id", Rule::NonNegative),
    ],
};

/// List a folder (root when absent).
pub const FOLDER_LIST: Schema = Schema {
    name: "folder_list",
    fields: &[Field::optional("fld_id", Rule::NonNegative)],
};

/// Create a folder.
pub const FOLDER_CREATE: Schema = Schema {
    name: "folder_create",
    fields: &[
        Field::required("name", Rule::String),
        Field::optional("parent_id", Rule::NonNegative),
    ],
};

/// Rename a folder.
pub const FOLDER_RENAME: Schema = Schema {
    name: "folder_rename",
    fields: &[
        Field::required("fld_id", Rule::NonNegative),
        Field::required("name", Rule::String),
    ],
};

/// Checks `data` against `schema`.
///
/// Collects every violation rather than stopping at the first one.
///
/// # Errors
///
/// Returns a [`Validation`](super::ErrorKind::Validation) error listing all
/// field-level violations when `data` does not match.
#[instrument(skip(data), fields(schema = schema.name))]
pub fn validate(schema: &Schema, data: &Value) -> Result<Params, ApiError> {
    let Some(object) = data.as_object() else {
        return Err(ApiError::validation(vec![Violation::new(
            schema.name,
            "expected an object",
        )]));
    };

    let mut params = Params::new();
    let mut violations = Vec::new();

    for field in schema.fields {
        match object.get(field.name).filter(|value| !value.is_null()) {
            None if field.required => {
                violations.push(Violation::new(field.name, "is required"));
            }
            None => {}
            Some(value) => match check(field.rule, value) {
                Ok(rendered) => params.push(field.name, rendered),
                Err(message) => violations.push(Violation::new(field.name, message)),
            },
        }
    }

    if violations.is_empty() {
        Ok(params)
    } else {
        debug!(violations = violations.len(), "validation failed");
        Err(ApiError::validation(violations))
    }
}

/// Checks one value and renders it as a query value.
fn check(rule: Rule, value: &Value) -> Result<String, String> {
    match rule {
        Rule::String => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "must be a string".to_string()),
        Rule::NonEmptyString => non_empty(value, "must not be empty"),
        Rule::Required(message) => non_empty(value, message),
        Rule::Url => {
            let text = value.as_str().ok_or_else(|| "must be a string".to_string())?;
            Url::parse(text)
                .map(|_| text.to_string())
                .map_err(|e| format!("must be a valid URL ({e})"))
        }
        Rule::Positive => number(value, |n| n > 0.0, "must be a positive number"),
        Rule::NonNegative => number(value, |n| n >= 0.0, "must be a non-negative number"),
        Rule::Boolean => value
            .as_bool()
            .map(|b| b.to_string())
            .ok_or_else(|| "must be a boolean".to_string()),
        Rule::StringOrNumber => match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            _ => Err("must be a string or a number".to_string()),
        },
        Rule::CodeList => code_list(value),
    }
}

fn non_empty(value: &Value, empty_message: &str) -> Result<String, String> {
    match value.as_str() {
        Some("") => Err(empty_message.to_string()),
        Some(text) => Ok(text.to_string()),
        None => Err("must be a string".to_string()),
    }
}

fn number(value: &Value, accept: impl Fn(f64) -> bool, message: &str) -> Result<String, String> {
    match value {
        Value::Number(number) if number.as_f64().is_some_and(&accept) => Ok(number.to_string()),
        _ => Err(message.to_string()),
    }
}

fn code_list(value: &Value) -> Result<String, String> {
    let codes: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    if codes.is_empty() {
        return Err("must contain at least one code".to_string());
    }

    let mut rendered = Vec::with_capacity(codes.len());
    for (index, code) in codes.into_iter().enumerate() {
        match code.as_str() {
            Some("") => return Err(format!("code at index {index} must not be empty")),
            Some(text) => rendered.push(text),
            None => return Err(format!("code at index {index} must be a string")),
        }
    }
    Ok(rendered.join(","))
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render)
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ErrorKind;

    fn fields(error: &ApiError) -> Vec<&str> {
        error.violations().iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_validate_config_accepts_minimal() {
        let params = validate(&CONFIG, &json!({"api_key": "secret"})).unwrap();
        assert_eq!(params.get("api_key"), Some("secret"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_validate_config_empty_key_uses_missing_key_message() {
        let error = validate(&CONFIG, &json!({"api_key": ""})).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.violations()[0].message, "API key is required");
    }

    #[test]
    fn test_validate_config_collects_every_violation() {
        let error = validate(
            &CONFIG,
            &json!({"api_key": "", "base_url": "not a url", "timeout": 0, "retry_delay": -5}),
        )
        .unwrap_err();
        assert_eq!(fields(&error), ["api_key", "base_url", "timeout", "retry_delay"]);
    }

    #[test]
    fn test_validate_missing_required_field() {
        let error = validate(&PREMIUM_KEY, &json!({"days": 30})).unwrap_err();
        assert_eq!(fields(&error), ["amount"]);
        assert_eq!(error.violations()[0].message, "is required");
    }

    #[test]
    fn test_validate_null_counts_as_absent() {
        let params = validate(&FOLDER_LIST, &json!({"fld_id": null})).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_validate_non_negative_accepts_zero_positive_rejects_zero() {
        assert!(validate(&FOLDER_LIST, &json!({"fld_id": 0})).is_ok());
        assert!(validate(&PREMIUM_KEY, &json!({"days": 0, "amount": 1})).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_types() {
        let error = validate(
            &FILE_LIST,
            &json!({"page": "1", "preview": "yes", "created": true, "name": 5}),
        )
        .unwrap_err();
        assert_eq!(fields(&error), ["page", "created", "name", "preview"]);
    }

    #[test]
    fn test_validate_file_list_renders_in_schema_order() {
        let params = validate(
            &FILE_LIST,
            &json!({"preview": true, "page": 2, "created": "2024-01-01", "unknown": 1}),
        )
        .unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            [("page", "2"), ("created", "2024-01-01"), ("preview", "true")]
        );
    }

    #[test]
    fn test_validate_code_list_joins_codes() {
        let params = validate(&FILE_CODES, &json!({"file_code": ["abc", "def"]})).unwrap();
        assert_eq!(params.get("file_code"), Some("abc,def"));
    }

    #[test]
    fn test_validate_code_list_accepts_single_string() {
        let params = validate(&DELETE_CODES, &json!({"del_code": "abc"})).unwrap();
        assert_eq!(params.get("del_code"), Some("abc"));
    }

    #[test]
    fn test_validate_code_list_rejects_empty_entries() {
        let error = validate(&FILE_CODES, &json!({"file_code": ["abc", ""]})).unwrap_err();
        assert!(error.violations()[0].message.contains("index 1"));
        assert!(validate(&FILE_CODES, &json!({"file_code": []})).is_err());
    }

    #[test]
    fn test_validate_remote_upload_url() {
        assert!(validate(&REMOTE_UPLOAD, &json!({"url": "https://example.com/video.mp4"})).is_ok());
        let error = validate(&REMOTE_UPLOAD, &json!({"url": "example.com/video"})).unwrap_err();
        assert_eq!(fields(&error), ["url"]);
    }

    #[test]
    fn test_validate_non_object_input() {
        let error = validate(&FILE_CLONE, &json!("abc")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_params_from_object_renders_scalars() {
        let params = Params::from_object(&json!({"a": 1, "b": null, "c": [1, 2], "d": false}));
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), None);
        assert_eq!(params.get("c"), Some("1,2"));
        assert_eq!(params.get("d"), Some("false"));
    }
}
