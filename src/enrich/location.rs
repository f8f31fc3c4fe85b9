// src/enrich/location.rs
use anyhow::Result;
use async_trait::async_trait;

use super::here::ReverseGeocode;
use super::http::ApiEndpoint;
use super::LocationLookup;
use crate::photo::{LocationResult, PhotoRecord};
use crate::pipeline::ChannelBundle;

/// Country + city via HERE reverse geocoding.
pub struct HereLocationClient {
    endpoint: ApiEndpoint,
}

impl HereLocationClient {
    pub fn new(here_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            endpoint: ApiEndpoint::new(here_url, api_key, "apiKey")?,
        })
    }
}

#[async_trait]
impl LocationLookup for HereLocationClient {
    async fn enhance_with_location(&self, photo: &PhotoRecord, bundle: &ChannelBundle) {
        let at = photo.lat_lon.to_at();
        let query = [("at", at.as_str()), ("lang", "en-US")];

        let res: ReverseGeocode = match self.endpoint.get_json(&query).await {
            Ok(r) => r,
            Err(e) => {
                let unrecoverable = e.is_unrecoverable();
                bundle
                    .report_error(format!(
                        "failure to retrieve location data for {photo}: {e}"
                    ))
                    .await;
                if unrecoverable {
                    bundle.cancel();
                }
                return;
            }
        };

        let Some(first) = res.items.into_iter().next() else {
            bundle
                .report_error(format!(
                    "failure to retrieve location data for LatLon {at}: no items"
                ))
                .await;
            return;
        };

        let result = LocationResult {
            article_id: photo.article_id.clone(),
            photo_index: photo.index,
            country: first.address.country_name,
            city: first.address.city,
        };
        if let Err(e) = bundle.send_location(result).await {
            tracing::warn!(error = %e, photo = photo.index, "location result dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::LatLon;
    use crate::pipeline::BundleReceivers;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    /// Serves one canned response on a local port. The receiver yields the
    /// request head.
    async fn geocoder(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });
        (format!("http://{addr}/v1/revgeocode"), rx)
    }

    fn positano() -> PhotoRecord {
        PhotoRecord {
            article_id: "italy.csv".into(),
            index: 3,
            timestamp: "2019-07-29T11:11:59Z".into(),
            lat_lon: LatLon {
                latitude: "40.628".into(),
                longitude: "14.485".into(),
            },
        }
    }

    async fn lookup(status: &str, body: &str) -> (Arc<ChannelBundle>, BundleReceivers, String) {
        let (url, request) = geocoder(status, body).await;
        let client = HereLocationClient::new(&url, "secret").unwrap();
        let (bundle, rx) = ChannelBundle::for_article("italy.csv", &CancellationToken::new());
        client.enhance_with_location(&positano(), &bundle).await;
        (bundle, rx, request.await.unwrap())
    }

    #[tokio::test]
    async fn first_item_becomes_the_location_result() {
        let body = r#"{"items":[{"title":"Positano","address":{"countryName":"Italy","city":"Positano"}},
                      {"address":{"countryName":"Italy","city":"Amalfi"}}]}"#;
        let (bundle, mut rx, request) = lookup("200 OK", body).await;

        let got = rx.location.try_recv().unwrap();
        assert_eq!(got.article_id, "italy.csv");
        assert_eq!(got.photo_index, 3);
        assert_eq!(got.country, "Italy");
        assert_eq!(got.city, "Positano");
        assert!(rx.location.try_recv().is_err());
        assert!(rx.errors.try_recv().is_err());
        assert!(!bundle.cancel_signal().is_cancelled());

        let line = request.lines().next().unwrap();
        assert!(line.starts_with("GET /v1/revgeocode?at=40.628%2C14.485&lang=en-US&apiKey=secret "), "{line}");
    }

    #[tokio::test]
    async fn zero_items_is_a_per_photo_error() {
        let (bundle, mut rx, _) = lookup("200 OK", r#"{"items":[]}"#).await;

        let msg = rx.errors.try_recv().unwrap();
        assert_eq!(msg, "failure to retrieve location data for LatLon 40.628,14.485: no items");
        assert!(rx.location.try_recv().is_err());
        assert!(!bundle.cancel_signal().is_cancelled());
    }

    #[tokio::test]
    async fn rejected_key_reports_once_then_cancels_the_article() {
        for status in ["401 Unauthorized", "403 Forbidden"] {
            let (bundle, mut rx, _) = lookup(status, "").await;

            let msg = rx.errors.try_recv().unwrap();
            assert!(msg.contains("rejected credentials"), "{msg}");
            assert!(msg.contains(&status[..3]), "{msg}");
            assert!(rx.errors.try_recv().is_err(), "exactly one error for {status}");
            assert!(rx.location.try_recv().is_err());
            assert!(bundle.cancel_signal().is_cancelled());
        }
    }

    #[tokio::test]
    async fn rate_limit_has_its_own_message_and_is_not_fatal() {
        let (bundle, mut rx, _) = lookup("429 Too Many Requests", "").await;

        let msg = rx.errors.try_recv().unwrap();
        assert!(msg.contains("responds with too many requests error"), "{msg}");
        assert!(rx.errors.try_recv().is_err());
        assert!(!bundle.cancel_signal().is_cancelled());
    }

    #[tokio::test]
    async fn other_statuses_are_per_photo_errors() {
        let (bundle, mut rx, _) = lookup("500 Internal Server Error", "oops").await;

        let msg = rx.errors.try_recv().unwrap();
        assert!(msg.starts_with("failure to retrieve location data for "), "{msg}");
        assert!(msg.ends_with("HTTP status = 500"), "{msg}");
        assert!(rx.location.try_recv().is_err());
        assert!(!bundle.cancel_signal().is_cancelled());
    }
}
