//! Mercado Pago payment intents for Pix checkout.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::money::Money;

const PAYMENTS_URL: &str = "https://api.mercadopago.com/v1/payments";

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    ticket_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MercadoPagoClient {
    http: reqwest::Client,
    access_token: Option<String>,
    notification_url: Option<String>,
}

impl MercadoPagoClient {
    pub fn new(
        http: reqwest::Client,
        access_token: Option<String>,
        notification_url: Option<String>,
    ) -> Self {
        Self { http, access_token, notification_url }
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    /// Creates a Pix payment and returns the hosted ticket URL the buyer is
    /// redirected to. `None` when the gateway is unconfigured or the call
    /// fails; checkout then falls back to a neutral pending page.
    pub async fn create_pix_payment(
        &self,
        order_id: Uuid,
        amount: Money,
        description: &str,
    ) -> Option<String> {
        let token = self.access_token.as_ref()?;

        // The gateway API takes decimal reais; cents are converted at this
        // boundary only.
        let body = json!({
            "transaction_amount": amount.cents() as f64 / 100.0,
            "description": description,
            "payment_method_id": "pix",
            "external_reference": order_id,
            "notification_url": self.notification_url,
        });

        let response = self
            .http
            .post(PAYMENTS_URL)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "mercadopago rejected payment request");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "mercadopago unavailable");
                return None;
            }
        };

        match response.json::<PaymentResponse>().await {
            Ok(payment) => payment
                .point_of_interaction
                .and_then(|poi| poi.transaction_data)
                .and_then(|data| data.ticket_url),
            Err(err) => {
                tracing::warn!(error = %err, "mercadopago payment response unparseable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_gateway_yields_none() {
        let client = MercadoPagoClient::new(reqwest::Client::new(), None, None);
        assert!(!client.is_configured());
        let url = client
            .create_pix_payment(Uuid::new_v4(), Money::from_cents(10_640), "Pedido")
            .await;
        assert_eq!(url, None);
    }

    #[test]
    fn test_payment_response_parsing() {
        let body: PaymentResponse = serde_json::from_str(
            r#"{"id": 123, "point_of_interaction": {"transaction_data": {"ticket_url": "https://mp.example/ticket/abc"}}}"#,
        )
        .expect("parse");
        let url = body
            .point_of_interaction
            .and_then(|p| p.transaction_data)
            .and_then(|d| d.ticket_url);
        assert_eq!(url.as_deref(), Some("https://mp.example/ticket/abc"));
    }

    #[test]
    fn test_payment_response_without_ticket() {
        let body: PaymentResponse =
            serde_json::from_str(r#"{"id": 123, "status": "rejected"}"#).expect("parse");
        assert!(body.point_of_interaction.is_none());
    }
}
