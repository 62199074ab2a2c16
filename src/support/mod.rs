use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

pub mod endpoints;
pub mod mailer;

/// A filled-in support form. Every field is present and non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SupportRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub ref_id: String,
}

/// The form as posted. Fields may be any scalar; numbers and `true` are
/// taken as their text.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestBody {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub message: Option<Value>,
    pub ref_id: Option<Value>,
}

impl SupportRequest {
    pub fn from_body(body: SupportRequestBody) -> Result<SupportRequest, Error> {
        // "", 0, false, null and nested values all count as not filled in
        fn given(value: Option<Value>) -> Result<String, Error> {
            let text = match value {
                Some(Value::String(text)) => text,
                Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
                Some(Value::Bool(true)) => "true".to_string(),
                _ => String::new(),
            };

            if text.is_empty() {
                return Err(Error::IncompleteSupportRequest);
            }

            Ok(text)
        }

        Ok(SupportRequest {
            name: given(body.name)?,
            email: given(body.email)?,
            message: given(body.message)?,
            ref_id: given(body.ref_id)?,
        })
    }

    pub fn subject(&self) -> String {
        format!("Support Request [Ref ID: {}]", self.ref_id)
    }

    pub fn render_html(&self) -> String {
        format!(
            "<h3>Support Form Submission</h3>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong> {}</p>\n\
             <p><strong>Ref ID:</strong> {}</p>\n",
            escape_html(&self.name),
            escape_html(&self.email),
            escape_html(&self.message),
            escape_html(&self.ref_id),
        )
    }
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
