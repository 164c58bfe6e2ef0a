/// Error type for HTTP push failure modes
#[derive(Debug)]
pub enum Error {
    /// Subscription endpoint was not an absolute URL
    InvalidEndpoint,
    /// Subscription `p256dh` or `auth` value failed validation
    InvalidSubscriptionKey,
    /// Subscription public key was not a usable P-256 point
    KeyAgreement,
    /// Internal content-encoding error
    Ece(ece_aesgcm::Error),
    /// VAPID signing key could not be read
    SigningKey,
    /// Push request could not be assembled
    Http(http::Error),
    /// Push request could not be delivered
    Delivery(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidEndpoint => write!(f, "invalid subscription endpoint"),
            Error::InvalidSubscriptionKey => write!(f, "invalid subscription key"),
            Error::KeyAgreement => write!(f, "key agreement failed"),
            Error::Ece(ece) => write!(f, "ece: {}", ece),
            Error::SigningKey => write!(f, "invalid vapid signing key"),
            Error::Http(http) => write!(f, "http: {}", http),
            Error::Delivery(delivery) => write!(f, "delivery: {}", delivery),
        }
    }
}
