//! Driving distance between the store and a delivery point, via the Google
//! Distance Matrix API. Any failure degrades to zero kilometers, which keeps
//! the quote chain deterministic when the maps provider is down.

use serde::Deserialize;

const DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    distance: Option<MatrixDistance>,
}

#[derive(Debug, Deserialize)]
struct MatrixDistance {
    /// Meters.
    value: f64,
}

#[derive(Debug, Clone)]
pub struct DistanceClient {
    http: reqwest::Client,
    api_key: Option<String>,
    origin_lat: f64,
    origin_lng: f64,
}

impl DistanceClient {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        origin_lat: f64,
        origin_lng: f64,
    ) -> Self {
        Self { http, api_key, origin_lat, origin_lng }
    }

    /// Kilometers from the store to the destination, or 0.0 when the maps
    /// provider is unconfigured or unreachable.
    pub async fn distance_km(&self, lat: f64, lng: f64) -> f64 {
        let Some(api_key) = &self.api_key else {
            return 0.0;
        };

        let response = self
            .http
            .get(DISTANCE_MATRIX_URL)
            .query(&[
                ("origins", format!("{},{}", self.origin_lat, self.origin_lng)),
                ("destinations", format!("{},{}", lat, lng)),
                ("key", api_key.clone()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "distance matrix rejected request");
                return 0.0;
            }
            Err(err) => {
                tracing::warn!(error = %err, "distance matrix unavailable");
                return 0.0;
            }
        };

        match response.json::<MatrixResponse>().await {
            Ok(body) => {
                let meters = body
                    .rows
                    .first()
                    .and_then(|row| row.elements.first())
                    .and_then(|el| el.distance.as_ref())
                    .map(|d| d.value)
                    .unwrap_or(0.0);
                meters / 1000.0
            }
            Err(err) => {
                tracing::warn!(error = %err, "distance matrix unparseable");
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_key_yields_zero() {
        let client = DistanceClient::new(reqwest::Client::new(), None, -23.561684, -46.625378);
        assert_eq!(client.distance_km(-23.55, -46.63).await, 0.0);
    }

    #[test]
    fn test_matrix_parsing() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"rows":[{"elements":[{"distance":{"value":5230.0,"text":"5.2 km"}}]}]}"#,
        )
        .expect("parse");
        let meters = body.rows[0].elements[0].distance.as_ref().map(|d| d.value);
        assert_eq!(meters, Some(5230.0));
    }

    #[test]
    fn test_matrix_parsing_tolerates_empty_rows() {
        let body: MatrixResponse = serde_json::from_str(r#"{"status":"ZERO_RESULTS"}"#)
            .expect("parse");
        assert!(body.rows.is_empty());
    }
}
