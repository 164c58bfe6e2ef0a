use crate::error::Error;
use crate::uncompressed;
use aes_gcm::aead::OsRng;
use base64ct::{Base64UrlUnpadded, Encoding};
use http::Uri;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Validity period claimed by generated tokens
pub const TOKEN_DURATION: Duration = Duration::from_secs(12 * 60 * 60);

// Push services compare this segment byte for byte, so it is kept as a
// fixed string rather than going through a serializer.
const JWT_HEADER: &str = r#"{"typ":"JWT","alg":"ES256"}"#;

#[derive(Serialize)]
struct VapidClaims<'a> {
    aud: &'a str,
    exp: u64,
    sub: &'a str,
}

/// VAPID signing configuration: the application server key pair and the
/// contact URI claimed by generated tokens.
///
/// Construct this once at startup and hand it to every sender. The public
/// key in its URL-safe base64 form doubles as the `applicationServerKey`
/// browsers expect when subscribing.
#[derive(Clone)]
pub struct VapidKeys {
    secret: p256::SecretKey,
    public_b64: String,
    contact: String,
}

impl VapidKeys {
    /// Generates a fresh key pair.
    ///
    /// Existing subscriptions are bound to the public key they were created
    /// with, so generated keys should be exported with
    /// [`VapidKeys::to_jwk_string`] and persisted.
    pub fn generate<T: Into<String>>(contact: T) -> Self {
        let secret = p256::SecretKey::random(&mut OsRng);
        Self::from_secret(secret, contact.into())
    }

    /// Reads the private key from its JWK representation. The public key is
    /// derived from it, so the pair cannot disagree.
    pub fn from_jwk<T: Into<String>>(jwk: &str, contact: T) -> Result<Self, Error> {
        let secret = p256::SecretKey::from_jwk_str(jwk).map_err(|_| Error::SigningKey)?;
        Ok(Self::from_secret(secret, contact.into()))
    }

    fn from_secret(secret: p256::SecretKey, contact: String) -> Self {
        let public_b64 = Base64UrlUnpadded::encode_string(&uncompressed(&secret.public_key()));
        Self {
            secret,
            public_b64,
            contact,
        }
    }

    /// Uncompressed public key as unpadded URL-safe base64, the form used
    /// by the `Crypto-Key: p256ecdsa` parameter and by
    /// `pushManager.subscribe`.
    pub fn public_key_b64(&self) -> &str {
        &self.public_b64
    }

    /// Contact URI claimed as the token subject.
    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Private key as a JWK string, for provisioning.
    pub fn to_jwk_string(&self) -> String {
        self.secret.to_jwk_string().to_string()
    }

    /// Creates the `Authorization` header value for a push request to
    /// `endpoint`: the scheme name `WebPush` followed by a signed compact
    /// token restricted to the endpoint's origin and valid for
    /// [`TOKEN_DURATION`].
    pub fn authorization(&self, endpoint: &Uri) -> Result<String, Error> {
        let aud = audience(endpoint)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let exp = (now + TOKEN_DURATION).as_secs();

        Ok(format!("WebPush {}", self.sign_token(&aud, exp)))
    }

    fn sign_token(&self, aud: &str, exp: u64) -> String {
        let claims = VapidClaims {
            aud,
            exp,
            sub: &self.contact,
        };
        let claims = serde_json::to_string(&claims)
            .expect("claims of plain strings and integers always serialize");

        let signing_input = format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(JWT_HEADER.as_bytes()),
            Base64UrlUnpadded::encode_string(claims.as_bytes())
        );

        let signing_key = SigningKey::from(&self.secret);
        let signature: Signature = signing_key.sign(signing_input.as_bytes());

        format!(
            "{}.{}",
            signing_input,
            Base64UrlUnpadded::encode_string(signature.to_bytes().as_slice())
        )
    }
}

impl fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key", &self.public_b64)
            .field("contact", &self.contact)
            .finish_non_exhaustive()
    }
}

/// Origin of the push service endpoint, as claimed in the token audience.
pub fn audience(endpoint: &Uri) -> Result<String, Error> {
    let scheme = endpoint.scheme_str().ok_or(Error::InvalidEndpoint)?;
    let host = endpoint.host().ok_or(Error::InvalidEndpoint)?;

    Ok(match endpoint.port_u16() {
        Some(port) => format!("{}://{}:{}", scheme, host, port),
        None => format!("{}://{}", scheme, host),
    })
}
