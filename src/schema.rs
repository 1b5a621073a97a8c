//! Declarative request shapes and the checker that enforces them.
//!
//! Every accepted body is described by a `const` [`Shape`]. [`check`] walks a
//! JSON value against a shape and reports one [`FieldIssue`] per violated
//! constraint. Fields of an object are checked in declaration order and nested
//! objects are only entered once the enclosing level is done, so issues come out
//! outermost first. A value that produces no issues is then decoded into its
//! typed form with `serde_json`.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::types::{
    CreateUserRequest, ProviderEvent, StripeDisputeEvent, UpdateUserRequest, WebhookEnvelope,
    WebhookType,
};

// ─── Issues ──────────────────────────────────────────────────────────────────

/// One violated constraint, addressed by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered list of issues for a rejected input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationFailure {
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────────

/// Extra checks applied to string values.
#[derive(Debug, Clone, Copy)]
pub struct StrRules {
    pub min: Option<(usize, &'static str)>,
    pub max: Option<(usize, &'static str)>,
    pub email: Option<&'static str>,
}

impl StrRules {
    pub const ANY: StrRules = StrRules {
        min: None,
        max: None,
        email: None,
    };
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    String(StrRules),
    Number,
    Boolean,
    /// Any value, including a missing one.
    Any,
    /// Any JSON object, contents unchecked.
    Record,
    Nullable(&'static Shape),
    Array(&'static Shape),
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub optional: bool,
}

const fn required(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        optional: false,
    }
}

const fn optional(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        optional: true,
    }
}

const STRING: Shape = Shape::String(StrRules::ANY);

impl Shape {
    fn expected(&self) -> String {
        match self {
            Shape::String(_) => "string".to_string(),
            Shape::Number => "number".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::Any => "any".to_string(),
            Shape::Record | Shape::Object(_) => "object".to_string(),
            Shape::Array(_) => "array".to_string(),
            Shape::Nullable(inner) => format!("{} or null", inner.expected()),
        }
    }

    fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Any, _) => true,
            (Shape::String(_), Value::String(_)) => true,
            (Shape::Number, Value::Number(_)) => true,
            (Shape::Boolean, Value::Bool(_)) => true,
            (Shape::Record | Shape::Object(_), Value::Object(_)) => true,
            (Shape::Array(_), Value::Array(_)) => true,
            (Shape::Nullable(_), Value::Null) => true,
            (Shape::Nullable(inner), other) => inner.admits(other),
            _ => false,
        }
    }
}

fn received(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn type_message(shape: &Shape, value: Option<&Value>) -> String {
    format!(
        "Invalid input: expected {}, received {}",
        shape.expected(),
        received(value)
    )
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

// ─── Checker ─────────────────────────────────────────────────────────────────

type Pending<'v> = VecDeque<(String, &'v Map<String, Value>, &'static [Field])>;

/// Check `value` (located at `path`) against `shape`.
pub fn check(path: &str, value: Option<&Value>, shape: &Shape) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut pending: Pending<'_> = VecDeque::new();

    check_value(path.to_string(), value, shape, &mut issues, &mut pending);

    while let Some((object_path, map, fields)) = pending.pop_front() {
        for field in fields {
            let field_value = map.get(field.name);
            if field_value.is_none() && field.optional {
                continue;
            }
            check_value(
                join(&object_path, field.name),
                field_value,
                &field.shape,
                &mut issues,
                &mut pending,
            );
        }
    }

    issues
}

fn check_value<'v>(
    path: String,
    value: Option<&'v Value>,
    shape: &Shape,
    issues: &mut Vec<FieldIssue>,
    pending: &mut Pending<'v>,
) {
    if matches!(shape, Shape::Any) {
        return;
    }

    let value = match value {
        Some(v) if shape.admits(v) => v,
        other => {
            issues.push(FieldIssue::new(path, type_message(shape, other)));
            return;
        }
    };

    match (shape, value) {
        (Shape::String(rules), Value::String(s)) => check_string(&path, s, rules, issues),
        (Shape::Nullable(inner), v) if !v.is_null() => {
            check_value(path, Some(v), inner, issues, pending)
        }
        (Shape::Array(item_shape), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                check_value(
                    join(&path, &index.to_string()),
                    Some(item),
                    item_shape,
                    issues,
                    pending,
                );
            }
        }
        (Shape::Object(fields), Value::Object(map)) => pending.push_back((path, map, *fields)),
        _ => {}
    }
}

fn check_string(path: &str, s: &str, rules: &StrRules, issues: &mut Vec<FieldIssue>) {
    let len = s.chars().count();
    if let Some((min, message)) = rules.min {
        if len < min {
            issues.push(FieldIssue::new(path, message));
        }
    }
    if let Some((max, message)) = rules.max {
        if len > max {
            issues.push(FieldIssue::new(path, message));
        }
    }
    if let Some(message) = rules.email {
        if !s.validate_email() {
            issues.push(FieldIssue::new(path, message));
        }
    }
}

/// Check then decode. The decode step cannot fail for a value the shape admits,
/// but a mismatch between a shape and its Rust type is still reported as an issue.
fn conform<T: DeserializeOwned>(
    path: &str,
    value: Option<&Value>,
    shape: &Shape,
) -> Result<T, ValidationFailure> {
    let issues = check(path, value, shape);
    if !issues.is_empty() {
        return Err(ValidationFailure { issues });
    }
    let value = value.cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| ValidationFailure::single(path, e.to_string()))
}

// ─── Webhook schemas ─────────────────────────────────────────────────────────

const STRIPE_DISPUTE_FIELDS: &[Field] = &[
    required("id", STRING),
    required("object", STRING),
    required("amount", Shape::Number),
    required("balance_transactions", Shape::Array(&STRING)),
    required("charge", STRING),
    required("created", Shape::Number),
    required("currency", STRING),
    required("evidence", Shape::Any),
    required("evidence_details", Shape::Any),
    required("is_charge_refundable", Shape::Boolean),
    required("livemode", Shape::Boolean),
    required("metadata", Shape::Record),
    required("payment_intent", Shape::Nullable(&STRING)),
    required("reason", STRING),
    required("status", STRING),
];

const STRIPE_DISPUTE_DATA_FIELDS: &[Field] =
    &[required("object", Shape::Object(STRIPE_DISPUTE_FIELDS))];

/// Payload schema for `stripe-chargeback`.
pub const STRIPE_DISPUTE_EVENT: Shape = Shape::Object(&[
    required("id", STRING),
    required("object", STRING),
    required("api_version", STRING),
    required("created", Shape::Number),
    required("data", Shape::Object(STRIPE_DISPUTE_DATA_FIELDS)),
    required("livemode", Shape::Boolean),
    required("pending_webhooks", Shape::Number),
    required("request", Shape::Any),
    required("type", STRING),
]);

/// Schema bound to each webhook kind.
pub fn payload_shape(kind: WebhookType) -> &'static Shape {
    match kind {
        WebhookType::StripeChargeback => &STRIPE_DISPUTE_EVENT,
    }
}

fn unsupported_type_message() -> String {
    let options: Vec<String> = WebhookType::ALL
        .iter()
        .map(|kind| format!("\"{}\"", kind.tag()))
        .collect();
    format!("Invalid option: expected one of {}", options.join("|"))
}

/// Validate a decoded request body as a webhook envelope.
///
/// The `type` tag selects the payload schema, so an unknown tag is reported on
/// its own and the payload is only checked for being an object.
pub fn validate_envelope(raw: &Value) -> Result<WebhookEnvelope, ValidationFailure> {
    let Value::Object(body) = raw else {
        return Err(ValidationFailure::single(
            "",
            type_message(&Shape::Record, Some(raw)),
        ));
    };

    let kind = match body.get("type") {
        Some(Value::String(tag)) => WebhookType::from_tag(tag),
        _ => None,
    };
    let payload = body.get("payload");

    let Some(kind) = kind else {
        let mut issues = vec![FieldIssue::new("type", unsupported_type_message())];
        issues.extend(check("payload", payload, &Shape::Record));
        return Err(ValidationFailure { issues });
    };

    let payload = match kind {
        WebhookType::StripeChargeback => {
            let event: StripeDisputeEvent = conform("payload", payload, payload_shape(kind))?;
            ProviderEvent::StripeDispute(Box::new(event))
        }
    };

    Ok(WebhookEnvelope { kind, payload })
}

// ─── User schemas ────────────────────────────────────────────────────────────

const EMAIL: Shape = Shape::String(StrRules {
    min: None,
    max: None,
    email: Some("Invalid email format"),
});

const USERNAME: Shape = Shape::String(StrRules {
    min: Some((3, "Username must be at least 3 characters")),
    max: Some((50, "Username must be less than 50 characters")),
    email: None,
});

const PASSWORD: Shape = Shape::String(StrRules {
    min: Some((6, "Password must be at least 6 characters")),
    max: None,
    email: None,
});

const FIRST_NAME: Shape = Shape::String(StrRules {
    min: None,
    max: Some((50, "First name must be less than 50 characters")),
    email: None,
});

const LAST_NAME: Shape = Shape::String(StrRules {
    min: None,
    max: Some((50, "Last name must be less than 50 characters")),
    email: None,
});

pub const CREATE_USER: Shape = Shape::Object(&[
    required("email", EMAIL),
    required("username", USERNAME),
    required("password", PASSWORD),
    optional("first_name", FIRST_NAME),
    optional("last_name", LAST_NAME),
]);

pub const UPDATE_USER: Shape = Shape::Object(&[
    optional("email", EMAIL),
    optional("username", USERNAME),
    optional("first_name", FIRST_NAME),
    optional("last_name", LAST_NAME),
    optional("is_active", Shape::Boolean),
]);

pub fn validate_create_user(raw: &Value) -> Result<CreateUserRequest, ValidationFailure> {
    conform("", Some(raw), &CREATE_USER)
}

pub fn validate_update_user(raw: &Value) -> Result<UpdateUserRequest, ValidationFailure> {
    conform("", Some(raw), &UPDATE_USER)
}

/// Coerce a path segment into a user id.
pub fn parse_user_id(raw: &str) -> Result<u64, ValidationFailure> {
    raw.trim().parse::<u64>().map_err(|_| {
        ValidationFailure::single("id", "Invalid input: expected number, received NaN")
    })
}
