//! This crate implements "Generic Event Delivery Using Http Push" (web-push)
//! according to [RFC8030](https://www.rfc-editor.org/rfc/rfc8030), using the
//! legacy `aesgcm` content encoding and VAPID authorization.
//!
//! Messages are encrypted for exactly one [`Subscription`] at a time: every
//! send derives a fresh ephemeral P-256 key pair and salt, runs ECDH against
//! the subscription's `p256dh` key, and seals the payload with AES-128-GCM.
//! The push service never sees plaintext; it only relays the sealed record
//! together with the `Crypto-Key` and `Encryption` parameters a subscribed
//! browser needs to reverse the derivation.
//!
//! # Example
//!
//! This example shows how to deliver one notification to one, hard-coded
//! client. You are expected to keep a single [`PushClient`] per process and
//! to construct one [`WebPushRequest`] per message.
//!
//! ```
//! use web_push_aesgcm::{
//!     MessageBody, Notification, PushClient, Subscription, VapidKeys, WebPushRequest,
//! };
//!
//! // Placeholders for values provided by individual clients. In most cases,
//! // these will be retrieved in-browser using `pushManager.subscribe` on a
//! // service worker registration object.
//! const ENDPOINT: &str = "";
//! const P256DH: &str = "";
//! const AUTH: &str = "";
//!
//! // Placeholder for your private VAPID key in JWK form. Keep this private
//! // and out of your source tree in real projects!
//! const VAPID_JWK: &str = "";
//!
//! async fn push() -> Result<(), Box<dyn std::error::Error>> {
//!     let vapid = VapidKeys::from_jwk(VAPID_JWK, "mailto:john.doe@example.com")?;
//!     let subscription = Subscription::from_parts(ENDPOINT.parse()?, P256DH, AUTH)?;
//!
//!     let client = PushClient::new(vapid)?;
//!     let response = client
//!         .send(WebPushRequest {
//!             subscription,
//!             body: MessageBody {
//!                 notification: Notification::new("Hello!"),
//!             },
//!             ttl: 60,
//!             topic: None,
//!             urgency: None,
//!         })
//!         .await?;
//!
//!     println!("push service answered with {}", response.status());
//!     Ok(())
//! }
//! ```

#[cfg(feature = "client")]
mod client;
mod error;
mod notification;
mod serde_;
mod vapid;

pub use p256;

#[cfg(feature = "client")]
pub use crate::client::PushClient;
pub use crate::error::Error;
pub use crate::notification::{
    Direction, MessageBody, Notification, NotificationAction, Urgency, WebPushRequest,
};
pub use crate::vapid::{VapidKeys, TOKEN_DURATION};

use aes_gcm::aead::{
    generic_array::{typenum::U16, GenericArray},
    rand_core::RngCore,
    OsRng,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use http::{self, header, Request, Uri};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use std::time::Duration;

use ece_aesgcm::{PUBLIC_KEY_LENGTH, SALT_LENGTH};

/// HTTP push authentication secret
pub type Auth = GenericArray<u8, U16>;

const AUTH_INFO: &[u8] = b"Content-Encoding: auth\0";

/// One browser's push subscription: the push service endpoint plus the
/// client keys from `PushSubscription.getKey`.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub endpoint: Uri,
    pub p256dh: p256::PublicKey,
    pub auth: Auth,
}

impl Subscription {
    /// Validates and decodes the raw subscription values a client hands
    /// over: the endpoint URL, and `p256dh`/`auth` as unpadded URL-safe
    /// base64.
    ///
    /// All validation happens here, before any key agreement or network
    /// traffic. `p256dh` must decode to an uncompressed SEC1 point (65
    /// bytes, `0x04` prefix) on the P-256 curve, `auth` to exactly 16
    /// bytes.
    pub fn from_parts(endpoint: Uri, p256dh: &str, auth: &str) -> Result<Self, Error> {
        if endpoint.scheme_str().is_none() || endpoint.host().is_none() {
            return Err(Error::InvalidEndpoint);
        }

        Ok(Self {
            endpoint,
            p256dh: decode_p256dh(p256dh)?,
            auth: decode_auth(auth)?,
        })
    }
}

fn decode_p256dh(b64: &str) -> Result<p256::PublicKey, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(b64).map_err(|_| Error::InvalidSubscriptionKey)?;
    if bytes.len() != PUBLIC_KEY_LENGTH || bytes[0] != 0x04 {
        return Err(Error::InvalidSubscriptionKey);
    }

    p256::PublicKey::from_sec1_bytes(&bytes).map_err(|_| Error::KeyAgreement)
}

fn decode_auth(b64: &str) -> Result<Auth, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(b64).map_err(|_| Error::InvalidSubscriptionKey)?;
    if bytes.len() != 16 {
        return Err(Error::InvalidSubscriptionKey);
    }

    Ok(Auth::clone_from_slice(&bytes))
}

/// Output of [`encrypt`]: the sealed record plus the values the `Crypto-Key`
/// and `Encryption` request headers carry to the receiver.
#[derive(Clone, Debug)]
pub struct EncryptedMessage {
    /// Fresh random salt, sent as `Encryption: salt=<base64url>`
    pub salt: [u8; SALT_LENGTH],
    /// Ephemeral sender public key, sent as `Crypto-Key: dh=<base64url>`
    pub dh: [u8; PUBLIC_KEY_LENGTH],
    /// Padded, sealed record with the authentication tag appended
    pub ciphertext: Vec<u8>,
}

/// Reusable builder for HTTP push requests
#[derive(Clone, Debug)]
pub struct WebPushBuilder<'a> {
    endpoint: Uri,
    ua_public: p256::PublicKey,
    ua_auth: Auth,
    vapid: &'a VapidKeys,
    ttl: Duration,
    topic: Option<String>,
    urgency: Option<Urgency>,
}

impl<'a> WebPushBuilder<'a> {
    /// Creates a new [`WebPushBuilder`] factory for HTTP push requests to
    /// one subscription, authorized with `vapid`.
    ///
    /// Requests generated using this factory will have a `TTL` of zero
    /// seconds, no topic and no urgency. The same builder can produce any
    /// number of requests; every [`WebPushBuilder::build`] call uses fresh
    /// encryption material.
    pub fn new(subscription: &Subscription, vapid: &'a VapidKeys) -> Self {
        Self {
            endpoint: subscription.endpoint.clone(),
            ua_public: subscription.p256dh,
            ua_auth: subscription.auth,
            vapid,
            ttl: Duration::ZERO,
            topic: None,
            urgency: None,
        }
    }

    /// Sets how long the push service should retain the message for
    /// clients that are offline.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        let mut this = self;
        this.ttl = ttl;
        this
    }

    /// Sets the topic under which a newer message replaces this one.
    pub fn with_topic<T: Into<String>>(self, topic: T) -> Self {
        let mut this = self;
        this.topic = Some(topic.into());
        this
    }

    /// Sets the delivery urgency hint.
    pub fn with_urgency(self, urgency: Urgency) -> Self {
        let mut this = self;
        this.urgency = Some(urgency);
        this
    }

    /// Generates a new HTTP push request carrying `body`, encrypted with
    /// fresh key material and authorized for this builder's endpoint.
    pub fn build<T: Into<Vec<u8>>>(&self, body: T) -> Result<Request<Vec<u8>>, Error> {
        let message = encrypt(body.into(), &self.ua_public, &self.ua_auth)?;
        let authorization = self.vapid.authorization(&self.endpoint)?;

        let builder = Request::builder()
            .uri(self.endpoint.clone())
            .method(http::method::Method::POST)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_ENCODING, "aesgcm")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, message.ciphertext.len())
            .header(
                "Crypto-Key",
                format!(
                    "dh={}; p256ecdsa={}",
                    Base64UrlUnpadded::encode_string(&message.dh),
                    self.vapid.public_key_b64(),
                ),
            )
            .header(
                "Encryption",
                format!("salt={}", Base64UrlUnpadded::encode_string(&message.salt)),
            )
            .header("TTL", self.ttl.as_secs());

        let builder = match &self.topic {
            Some(topic) => builder.header("Topic", topic),
            None => builder,
        };
        let builder = match self.urgency {
            Some(urgency) => builder.header("Urgency", urgency.as_str()),
            None => builder,
        };

        builder.body(message.ciphertext).map_err(Error::Http)
    }
}

/// Lower-level encryption used for HTTP push request content
///
/// Generates a fresh salt and a fresh ephemeral key pair, so two calls with
/// identical arguments never reuse key material.
pub fn encrypt(
    message: Vec<u8>,
    ua_public: &p256::PublicKey,
    ua_auth: &Auth,
) -> Result<EncryptedMessage, Error> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    let as_secret = p256::SecretKey::random(&mut OsRng);
    encrypt_predictably(salt, message, &as_secret, ua_public, ua_auth).map_err(Error::Ece)
}

fn encrypt_predictably(
    salt: [u8; SALT_LENGTH],
    message: Vec<u8>,
    as_secret: &p256::SecretKey,
    ua_public: &p256::PublicKey,
    ua_auth: &Auth,
) -> Result<EncryptedMessage, ece_aesgcm::Error> {
    let as_public = as_secret.public_key();
    let shared = p256::ecdh::diffie_hellman(as_secret.to_nonzero_scalar(), ua_public.as_affine());

    let prk = derive_prk(ua_auth, &shared);
    let ua_bytes = uncompressed(ua_public);
    let as_bytes = uncompressed(&as_public);

    let ciphertext = ece_aesgcm::encrypt(prk, salt, &ua_bytes, &as_bytes, message)?;

    Ok(EncryptedMessage {
        salt,
        dh: as_bytes,
        ciphertext,
    })
}

fn derive_prk(auth: &Auth, shared: &p256::ecdh::SharedSecret) -> [u8; 32] {
    let mut prk = [0u8; 32];
    ece_aesgcm::derive(auth, shared.raw_secret_bytes(), AUTH_INFO, &mut prk)
        .expect("okm length is always 32 bytes, cannot be too large");

    prk
}

pub(crate) fn uncompressed(key: &p256::PublicKey) -> [u8; PUBLIC_KEY_LENGTH] {
    key.as_affine()
        .to_encoded_point(false)
        .as_bytes()
        .try_into()
        .expect("uncompressed P-256 points are always 65 bytes")
}
