use crate::types::{CanonicalChargeback, Provider, ProviderEvent, StripeDisputeEvent, WebhookType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// No mapping is registered for a kind the schema accepted.
    #[error("webhook type not supported: {0}")]
    Unsupported(WebhookType),

    /// The payload belongs to a different provider than the kind claims.
    #[error("payload for {kind} does not come from {expected}")]
    PayloadMismatch {
        kind: WebhookType,
        expected: &'static str,
    },
}

type Mapping = fn(WebhookType, &ProviderEvent) -> Result<CanonicalChargeback, TransformError>;

/// Closed dispatch table from webhook kind to its mapping.
const DISPATCH: &[(WebhookType, Mapping)] = &[(
    WebhookType::StripeChargeback,
    stripe_chargeback as Mapping,
)];

fn mapping_for(table: &[(WebhookType, Mapping)], kind: WebhookType) -> Option<Mapping> {
    table
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, mapping)| *mapping)
}

/// Translate a validated payload into the canonical chargeback record.
pub fn transform(
    kind: WebhookType,
    payload: &ProviderEvent,
) -> Result<CanonicalChargeback, TransformError> {
    transform_with(DISPATCH, kind, payload)
}

fn transform_with(
    table: &[(WebhookType, Mapping)],
    kind: WebhookType,
    payload: &ProviderEvent,
) -> Result<CanonicalChargeback, TransformError> {
    let Some(mapping) = mapping_for(table, kind) else {
        return Err(TransformError::Unsupported(kind));
    };

    tracing::info!(webhook_type = %kind, "transforming webhook");
    mapping(kind, payload)
}

fn stripe_chargeback(
    kind: WebhookType,
    payload: &ProviderEvent,
) -> Result<CanonicalChargeback, TransformError> {
    match payload {
        ProviderEvent::StripeDispute(event) => Ok(map_stripe_dispute(event)),
        #[allow(unreachable_patterns)]
        _ => Err(TransformError::PayloadMismatch {
            kind,
            expected: Provider::Stripe.as_str(),
        }),
    }
}

/// Project a Stripe dispute event onto the canonical record. The amount is
/// copied as-is, in the provider's minor units.
pub fn map_stripe_dispute(event: &StripeDisputeEvent) -> CanonicalChargeback {
    let dispute = &event.data.object;
    CanonicalChargeback {
        transaction_id: dispute.charge.clone(),
        reason: dispute.reason.clone(),
        currency: dispute.currency.clone(),
        amount: dispute.amount.clone(),
        provider: Provider::Stripe.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_envelope;
    use serde_json::json;

    fn payload(amount: serde_json::Value) -> ProviderEvent {
        let body = json!({
            "type": "stripe-chargeback",
            "payload": {
                "id": "evt_1",
                "object": "event",
                "api_version": "2019-02-19",
                "created": 1686089970,
                "data": { "object": {
                    "id": "du_1",
                    "object": "dispute",
                    "amount": amount,
                    "balance_transactions": ["txn_1"],
                    "charge": "ch_123",
                    "created": 1680651737,
                    "currency": "usd",
                    "evidence": {},
                    "evidence_details": {},
                    "is_charge_refundable": true,
                    "livemode": false,
                    "metadata": { "order": "42" },
                    "payment_intent": "pi_1",
                    "reason": "general",
                    "status": "warning_needs_response"
                }},
                "livemode": false,
                "pending_webhooks": 0,
                "request": null,
                "type": "charge.dispute.created"
            }
        });
        validate_envelope(&body).unwrap().payload
    }

    #[test]
    fn maps_stripe_dispute_fields() {
        let out = transform(WebhookType::StripeChargeback, &payload(json!(1000))).unwrap();
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "transaction_id": "ch_123",
                "reason": "general",
                "currency": "usd",
                "amount": 1000,
                "provider": "stripe"
            })
        );
    }

    #[test]
    fn amount_is_passed_through_verbatim() {
        let out = transform(WebhookType::StripeChargeback, &payload(json!(12.5))).unwrap();
        assert_eq!(serde_json::to_value(&out.amount).unwrap(), json!(12.5));

        let out = transform(WebhookType::StripeChargeback, &payload(json!(-7))).unwrap();
        assert_eq!(out.amount.as_i64(), Some(-7));
    }

    #[test]
    fn amounts_beyond_u64_keep_their_digits() {
        let amount: serde_json::Value = serde_json::from_str("100000000000000000000").unwrap();
        let out = transform(WebhookType::StripeChargeback, &payload(amount)).unwrap();
        assert_eq!(
            serde_json::to_string(&out.amount).unwrap(),
            "100000000000000000000"
        );

        let amount: serde_json::Value = serde_json::from_str("1000.10").unwrap();
        let out = transform(WebhookType::StripeChargeback, &payload(amount)).unwrap();
        assert_eq!(serde_json::to_string(&out.amount).unwrap(), "1000.10");
    }

    #[test]
    fn transform_is_idempotent() {
        let event = payload(json!(999));
        let first = transform(WebhookType::StripeChargeback, &event).unwrap();
        let second = transform(WebhookType::StripeChargeback, &event).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn every_webhook_type_has_a_mapping() {
        for kind in WebhookType::ALL {
            assert!(
                mapping_for(DISPATCH, *kind).is_some(),
                "no mapping registered for {kind}"
            );
        }
    }

    #[test]
    fn provider_comes_from_the_kind() {
        for kind in WebhookType::ALL {
            let out = transform(*kind, &payload(json!(1))).unwrap();
            assert_eq!(out.provider, kind.provider().as_str());
        }
    }

    #[test]
    fn missing_mapping_is_reported_not_misrouted() {
        let err = transform_with(&[], WebhookType::StripeChargeback, &payload(json!(1)))
            .unwrap_err();
        assert_eq!(err, TransformError::Unsupported(WebhookType::StripeChargeback));
        assert_eq!(
            err.to_string(),
            "webhook type not supported: stripe-chargeback"
        );
    }
}
