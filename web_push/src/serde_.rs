use crate::{Auth, Subscription};
use base64ct::{Base64UrlUnpadded, Encoding};
use http::Uri;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

// Wire form of a subscription as clients post it: the endpoint URL and the
// two `getKey` values as unpadded URL-safe base64.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Subscription")]
struct SubscriptionSerde<'a> {
    #[serde(serialize_with = "uri_to_string", deserialize_with = "string_to_uri")]
    endpoint: Cow<'a, Uri>,
    #[serde(serialize_with = "p256_to_string", deserialize_with = "string_to_p256")]
    p256dh: p256::PublicKey,
    #[serde(serialize_with = "auth_to_string", deserialize_with = "string_to_auth")]
    auth: Auth,
}

fn uri_to_string<S: Serializer>(uri: &Cow<Uri>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&uri.to_string())
}

fn string_to_uri<'de, D: Deserializer<'de>>(d: D) -> Result<Cow<'static, Uri>, D::Error> {
    let s: String = Deserialize::deserialize(d)?;
    let uri: Uri = s.parse().map_err(de::Error::custom)?;
    if uri.scheme_str().is_none() || uri.host().is_none() {
        return Err(de::Error::custom(crate::Error::InvalidEndpoint));
    }

    Ok(Cow::Owned(uri))
}

fn p256_to_string<S: Serializer>(key: &p256::PublicKey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&Base64UrlUnpadded::encode_string(
        key.to_encoded_point(false).as_bytes(),
    ))
}

fn string_to_p256<'de, D: Deserializer<'de>>(d: D) -> Result<p256::PublicKey, D::Error> {
    let b64: String = Deserialize::deserialize(d)?;
    crate::decode_p256dh(&b64).map_err(de::Error::custom)
}

fn auth_to_string<S: Serializer>(auth: &Auth, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&Base64UrlUnpadded::encode_string(auth.as_slice()))
}

fn string_to_auth<'de, D: Deserializer<'de>>(d: D) -> Result<Auth, D::Error> {
    let b64: String = Deserialize::deserialize(d)?;
    crate::decode_auth(&b64).map_err(de::Error::custom)
}

impl Serialize for Subscription {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SubscriptionSerde {
            endpoint: Cow::Borrowed(&self.endpoint),
            p256dh: self.p256dh,
            auth: self.auth,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Subscription {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = SubscriptionSerde::deserialize(deserializer)?;
        Ok(Subscription {
            endpoint: serde.endpoint.into_owned(),
            p256dh: serde.p256dh,
            auth: serde.auth,
        })
    }
}
