//! Declarative request validation.
//!
//! A [`Schema`] is a table of [`FieldSpec`]s. Each spec names the JSON key the
//! client sends, the column it is stored under, the [`Rule`] its value must
//! satisfy, and whether it is required or defaulted. Every resource describes
//! its create and patch bodies this way and [`Schema::validate`] evaluates
//! them all with the same code.

use serde::Serialize;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateUrl};

use crate::error::Error;
use crate::typedid::is_uuid;

/// Validated input keyed by store column name. Only recognised keys survive.
pub type Fields = Map<String, Value>;

#[derive(Clone, Copy, Debug)]
pub enum Rule {
    Text { min: usize, max: usize },
    Email,
    Url,
    Uuid,
    /// Integer greater than or equal to zero.
    Count,
    /// Number strictly greater than zero.
    Amount,
    OneOf(&'static [&'static str]),
    Any,
    List(&'static Schema),
}

impl Rule {
    pub const fn text() -> Rule {
        Rule::Text {
            min: 0,
            max: usize::MAX,
        }
    }

    pub const fn max(max: usize) -> Rule {
        Rule::Text { min: 0, max }
    }

    pub const fn between(min: usize, max: usize) -> Rule {
        Rule::Text { min, max }
    }

    fn check(&self, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Option<Value> {
        match self {
            Rule::Any => Some(widen_unsigned(value)),
            Rule::Text { min, max } => {
                let text = expect_string(value, path, issues)?;
                let length = text.chars().count();
                if length < *min {
                    issues.push(Issue::new(
                        path,
                        IssueCode::TooSmall,
                        format!("String must contain at least {} character(s)", min),
                    ));
                    return None;
                }
                if length > *max {
                    issues.push(Issue::new(
                        path,
                        IssueCode::TooBig,
                        format!("String must contain at most {} character(s)", max),
                    ));
                    return None;
                }
                Some(value.clone())
            }
            Rule::Email => {
                let text = expect_string(value, path, issues)?;
                if !text.validate_email() {
                    issues.push(Issue::new(path, IssueCode::InvalidString, "Invalid email"));
                    return None;
                }
                Some(value.clone())
            }
            Rule::Url => {
                let text = expect_string(value, path, issues)?;
                if !text.validate_url() {
                    issues.push(Issue::new(path, IssueCode::InvalidString, "Invalid url"));
                    return None;
                }
                Some(value.clone())
            }
            Rule::Uuid => {
                let text = expect_string(value, path, issues)?;
                if !is_uuid(text) {
                    issues.push(Issue::new(path, IssueCode::InvalidString, "Invalid uuid"));
                    return None;
                }
                Some(value.clone())
            }
            Rule::Count => {
                let number = expect_number(value, path, issues)?;
                // 3.0 is an integer as far as JSON clients are concerned
                let integer = match number.as_i64() {
                    Some(integer) => integer,
                    None => match number.as_f64() {
                        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => {
                            float as i64
                        }
                        Some(float) if float.fract() == 0.0 && float > 0.0 => {
                            issues.push(Issue::new(
                                path,
                                IssueCode::TooBig,
                                format!("Number must be less than or equal to {}", i64::MAX),
                            ));
                            return None;
                        }
                        Some(float) if float.fract() == 0.0 => {
                            issues.push(Issue::new(
                                path,
                                IssueCode::TooSmall,
                                "Number must be greater than or equal to 0",
                            ));
                            return None;
                        }
                        _ => {
                            issues.push(Issue::new(
                                path,
                                IssueCode::InvalidType,
                                "Expected integer, received float",
                            ));
                            return None;
                        }
                    },
                };
                if integer < 0 {
                    issues.push(Issue::new(
                        path,
                        IssueCode::TooSmall,
                        "Number must be greater than or equal to 0",
                    ));
                    return None;
                }
                Some(Value::from(integer))
            }
            Rule::Amount => {
                let number = expect_number(value, path, issues)?;
                let amount = number.as_f64().unwrap_or_default();
                if amount <= 0.0 {
                    issues.push(Issue::new(
                        path,
                        IssueCode::TooSmall,
                        "Number must be greater than 0",
                    ));
                    return None;
                }
                Some(Value::from(amount))
            }
            Rule::OneOf(options) => {
                let text = expect_string(value, path, issues)?;
                if !options.contains(&text.as_str()) {
                    let expected = options
                        .iter()
                        .map(|option| format!("'{}'", option))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    issues.push(Issue::new(
                        path,
                        IssueCode::InvalidEnumValue,
                        format!(
                            "Invalid enum value. Expected {}, received '{}'",
                            expected, text
                        ),
                    ));
                    return None;
                }
                Some(value.clone())
            }
            Rule::List(schema) => {
                let items = match value.as_array() {
                    Some(items) => items,
                    None => {
                        issues.push(Issue::invalid_type(path, "array", value));
                        return None;
                    }
                };
                let before = issues.len();
                let mut checked = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut item_path = path.to_vec();
                    item_path.push(PathSegment::Index(index));
                    checked.push(Value::Object(schema.check(item, &item_path, issues)));
                }
                if issues.len() > before {
                    return None;
                }
                Some(Value::Array(checked))
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub column: &'static str,
    pub rule: Rule,
    pub required: bool,
    pub default: Option<fn() -> Value>,
}

impl FieldSpec {
    pub const fn required(key: &'static str, column: &'static str, rule: Rule) -> FieldSpec {
        FieldSpec {
            key,
            column,
            rule,
            required: true,
            default: None,
        }
    }

    pub const fn optional(key: &'static str, column: &'static str, rule: Rule) -> FieldSpec {
        FieldSpec {
            key,
            column,
            rule,
            required: false,
            default: None,
        }
    }

    /// Fills `column` with `default()` when the key is absent from the input.
    pub const fn or(self, default: fn() -> Value) -> FieldSpec {
        FieldSpec {
            default: Some(default),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Schema {
        Schema { fields }
    }

    pub fn validate(&self, input: &Value) -> Result<Fields, Error> {
        let mut issues = vec![];
        let fields = self.check(input, &[], &mut issues);

        if !issues.is_empty() {
            return Err(Error::ValidationFailed { issues });
        }

        Ok(fields)
    }

    fn check(&self, input: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Fields {
        let mut fields = Fields::new();

        let object = match input.as_object() {
            Some(object) => object,
            None => {
                issues.push(Issue::invalid_type(path, "object", input));
                return fields;
            }
        };

        for spec in self.fields {
            let mut field_path = path.to_vec();
            field_path.push(PathSegment::Key(spec.key.to_string()));

            match object.get(spec.key) {
                Some(value) => {
                    if let Some(value) = spec.rule.check(value, &field_path, issues) {
                        fields.insert(spec.column.to_string(), value);
                    }
                }
                None => {
                    if let Some(default) = spec.default {
                        fields.insert(spec.column.to_string(), default());
                    } else if spec.required {
                        issues.push(Issue::new(&field_path, IssueCode::InvalidType, "Required"));
                    }
                }
            }
        }

        fields
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidString,
    InvalidEnumValue,
    TooSmall,
    TooBig,
}

/// One violated constraint, located by its path into the request body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    fn new(path: &[PathSegment], code: IssueCode, message: impl Into<String>) -> Issue {
        Issue {
            path: path.to_vec(),
            code,
            message: message.into(),
        }
    }

    fn invalid_type(path: &[PathSegment], expected: &str, received: &Value) -> Issue {
        Issue::new(
            path,
            IssueCode::InvalidType,
            format!("Expected {}, received {}", expected, type_name(received)),
        )
    }
}

fn expect_string<'a>(
    value: &'a Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<&'a String> {
    match value {
        Value::String(text) => Some(text),
        _ => {
            issues.push(Issue::invalid_type(path, "string", value));
            None
        }
    }
}

fn expect_number<'a>(
    value: &'a Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<&'a serde_json::Number> {
    match value {
        Value::Number(number) => Some(number),
        _ => {
            issues.push(Issue::invalid_type(path, "number", value));
            None
        }
    }
}

/// Stores have no unsigned 64-bit integers, so integers past `i64::MAX` are
/// kept as floats. JSON clients read them that way anyway.
fn widen_unsigned(value: &Value) -> Value {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(unsigned) if unsigned > i64::MAX as u64 => Value::from(unsigned as f64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(widen_unsigned).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), widen_unsigned(item)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
