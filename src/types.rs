use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

// ─── Webhook envelope ───────────────────────────────────────────────────────

/// Closed set of webhook kinds the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookType {
    StripeChargeback,
}

impl WebhookType {
    /// Every supported kind, in the order they are advertised to clients.
    pub const ALL: &'static [WebhookType] = &[WebhookType::StripeChargeback];

    pub fn tag(self) -> &'static str {
        match self {
            WebhookType::StripeChargeback => "stripe-chargeback",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.tag() == tag)
    }

    /// Provider the payload of this kind originates from.
    pub fn provider(self) -> Provider {
        match self {
            WebhookType::StripeChargeback => Provider::Stripe,
        }
    }
}

impl fmt::Display for WebhookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Stripe,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Stripe => "stripe",
        }
    }
}

/// A request body that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEnvelope {
    pub kind: WebhookType,
    pub payload: ProviderEvent,
}

/// Provider-specific event payloads, one variant per supported shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    StripeDispute(Box<StripeDisputeEvent>),
}

impl ProviderEvent {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderEvent::StripeDispute(_) => Provider::Stripe,
        }
    }
}

// ─── Stripe ──────────────────────────────────────────────────────────────────

/// `charge.dispute.*` event as delivered by Stripe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeDisputeEvent {
    pub id: String,
    pub object: String,
    pub api_version: String,
    pub created: Number,
    pub data: StripeDisputeData,
    pub livemode: bool,
    pub pending_webhooks: Number,
    #[serde(default)]
    pub request: Value,
    #[serde(rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeDisputeData {
    pub object: StripeDispute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeDispute {
    pub id: String,
    pub object: String,
    pub amount: Number,
    pub balance_transactions: Vec<String>,
    pub charge: String,
    pub created: Number,
    pub currency: String,
    #[serde(default)]
    pub evidence: Value,
    #[serde(default)]
    pub evidence_details: Value,
    pub is_charge_refundable: bool,
    pub livemode: bool,
    pub metadata: Map<String, Value>,
    pub payment_intent: Option<String>,
    pub reason: String,
    pub status: String,
}

// ─── Canonical output ────────────────────────────────────────────────────────

/// Provider-agnostic chargeback record every webhook kind is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalChargeback {
    pub transaction_id: String,
    pub reason: String,
    pub currency: String,
    pub amount: Number,
    pub provider: String,
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// User as returned over HTTP; never carries the password digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Insert payload for the user store (password already digested).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
