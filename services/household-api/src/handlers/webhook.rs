//! Stripe webhook handler

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use hearth_billing_core::webhook::{WebhookEvent, WebhookEventData, WebhookEventType};
use hearth_billing_core::BillingError;
use hearth_db::{HouseholdRepository, SubscriptionRepository};
use hearth_types::HouseholdId;

use crate::state::AppState;

/// POST /webhooks/stripe
///
/// Verify the event signature, then re-sync the affected household. Stripe
/// retries on non-2xx, so verification failures return 400 and transient
/// processing failures 500.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let start = Instant::now();

    let Some(sig_header) = headers.get("stripe-signature") else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    let Ok(signature) = sig_header.to_str() else {
        tracing::warn!("Invalid Stripe-Signature header encoding");
        return StatusCode::BAD_REQUEST;
    };

    let event = match state.webhooks.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook rejected");
            metrics::counter!("billing_webhooks_processed_total", "status" => "rejected")
                .increment(1);
            return StatusCode::BAD_REQUEST;
        }
    };

    match process_event(&state, event).await {
        Ok(()) => {
            metrics::counter!("billing_webhooks_processed_total", "status" => "success")
                .increment(1);
            metrics::histogram!(
                "billing_operation_duration_seconds",
                "operation" => "process_webhook"
            )
            .record(start.elapsed().as_secs_f64());
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = ?e, "Webhook processing failed");
            metrics::counter!("billing_webhooks_processed_total", "status" => "error").increment(1);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// React to a verified event by re-syncing the owning household.
///
/// The event payload is treated as a hint only; the sync re-reads the
/// authoritative state from the provider.
async fn process_event(state: &AppState, event: WebhookEvent) -> Result<(), BillingError> {
    let customer_id = match (&event.event_type, &event.data) {
        (WebhookEventType::Unknown(event_type), _) => {
            tracing::debug!(event_type = %event_type, "Ignoring unhandled webhook event");
            return Ok(());
        }
        (_, WebhookEventData::CheckoutSession(session)) => session.customer_id.clone(),
        (_, WebhookEventData::Subscription(sub)) => sub.customer_id.clone(),
        (_, WebhookEventData::Raw(_)) => return Ok(()),
    };

    if customer_id.is_empty() {
        tracing::warn!(event_id = %event.id, "Webhook event carries no customer id");
        return Ok(());
    }

    let Some(row) = state
        .repos
        .subscriptions
        .find_by_stripe_customer_id(&customer_id)
        .await?
    else {
        // Nothing to update; the customer will be bound on the next
        // authenticated sync.
        tracing::info!(customer_id = %customer_id, "No household for webhook customer");
        return Ok(());
    };

    let household_id = HouseholdId(row.household_id);
    let Some(household) = state
        .repos
        .households
        .find_by_id(row.household_id)
        .await?
    else {
        tracing::warn!(household_id = %household_id, "Subscription row without household");
        return Ok(());
    };

    state
        .billing
        .sync(household_id, &household.owner_email)
        .await?;
    state.resolver.invalidate(household_id).await;

    tracing::info!(
        event_id = %event.id,
        household_id = %household_id,
        "Webhook triggered household re-sync"
    );
    Ok(())
}
