//! Domain events published over NATS when a broker is configured.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Paid {
        order_id: Uuid,
        net_value_cents: i64,
    },
    Dispatched {
        order_id: Uuid,
        provider: String,
        fee_cents: i64,
    },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Paid { .. } => "orders.paid",
            Self::Dispatched { .. } => "orders.dispatched",
        }
    }
}

/// Fire-and-forget publish; a down broker never fails the request.
pub async fn publish(nats: Option<&async_nats::Client>, event: &OrderEvent) {
    let Some(client) = nats else { return };
    let payload = match serde_json::to_vec(event) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize order event");
            return;
        }
    };
    if let Err(err) = client.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!(error = %err, subject = event.subject(), "failed to publish order event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects() {
        let paid = OrderEvent::Paid { order_id: Uuid::new_v4(), net_value_cents: 100 };
        assert_eq!(paid.subject(), "orders.paid");
        let dispatched = OrderEvent::Dispatched {
            order_id: Uuid::new_v4(),
            provider: "manual".into(),
            fee_cents: 2540,
        };
        assert_eq!(dispatched.subject(), "orders.dispatched");
    }

    #[test]
    fn test_paid_payload_shape() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(OrderEvent::Paid { order_id: id, net_value_cents: 870 })
            .expect("serialize");
        assert_eq!(value["type"], "paid");
        assert_eq!(value["net_value_cents"], 870);
        assert_eq!(value["order_id"], id.to_string());
    }
}
