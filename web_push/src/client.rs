use crate::{Error, VapidKeys, WebPushBuilder, WebPushRequest};
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

/// HTTPS delivery of push requests to the push services named by
/// subscription endpoints.
///
/// The client holds a connection pool and the VAPID configuration; clone
/// it freely, clones share both.
#[derive(Clone)]
pub struct PushClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    vapid: VapidKeys,
}

impl PushClient {
    /// Creates a client trusting the platform's native TLS roots.
    pub fn new(vapid: VapidKeys) -> Result<Self, Error> {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| Error::Delivery(Box::new(e)))?
            .https_only()
            .enable_all_versions()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { client, vapid })
    }

    /// VAPID configuration this client authorizes requests with.
    pub fn vapid(&self) -> &VapidKeys {
        &self.vapid
    }

    /// Encrypts and delivers one push message.
    ///
    /// The push service's answer is returned as-is for every HTTP status,
    /// including rejections like `410 Gone` for lapsed subscriptions; only
    /// transport failures surface as [`Error::Delivery`].
    pub async fn send(&self, request: WebPushRequest) -> Result<Response<Bytes>, Error> {
        let payload =
            serde_json::to_vec(&request.body).expect("notification payloads always serialize");

        let mut builder = WebPushBuilder::new(&request.subscription, &self.vapid)
            .with_ttl(Duration::from_secs(request.ttl));
        if let Some(topic) = request.topic {
            builder = builder.with_topic(topic);
        }
        if let Some(urgency) = request.urgency {
            builder = builder.with_urgency(urgency);
        }

        let request = builder.build(payload)?;
        tracing::debug!(endpoint = %request.uri(), "sending web push request");

        let response = self
            .client
            .request(request.map(|body| Full::new(Bytes::from(body))))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "web push delivery failed");
                Error::Delivery(Box::new(e))
            })?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::Delivery(Box::new(e)))?
            .to_bytes();

        let response = Response::from_parts(parts, body);
        tracing::debug!(status = %response.status(), "push service responded");

        Ok(response)
    }
}
