//! This crate implements the legacy `aesgcm` flavor of Encrypted
//! Content-Encoding according to draft-ietf-httpbis-encryption-encoding-02,
//! as profiled for Web Push by draft-ietf-webpush-encryption-04.
//!
//! Unlike the newer `aes128gcm` scheme, `aesgcm` does not prefix the
//! ciphertext with a coding header. The salt and the sender's public key
//! travel out of band (for Web Push, in the `Encryption` and `Crypto-Key`
//! request headers), and every HKDF expansion is bound to both parties'
//! public keys through a shared derivation context.


use aes_gcm::{aead::consts::U12, AeadInPlace, Aes128Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use sha2::Sha256;

/// Error modes for `aesgcm` key derivation and encryption
#[derive(Debug)]
pub enum Error {
    /// The record passed to the encryption routine was too large
    RecordLengthInvalid,
    /// More output keying material was requested than a single HMAC
    /// block can provide
    OkmLengthInvalid,
    /// Internal AES-128-GCM error
    Aes128Gcm,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Length of the random salt carried in the `Encryption` header
pub const SALT_LENGTH: usize = 16;
/// Length of an uncompressed SEC1 P-256 public key
pub const PUBLIC_KEY_LENGTH: usize = 65;
/// Length of the padding length field prepended to every record
pub const PAD_LENGTH: usize = 2;
/// Length of the AES-GCM authentication tag appended to every record
pub const TAG_LENGTH: usize = 16;
/// Largest output a single-block HKDF expansion can produce
pub const MAX_OKM_LENGTH: usize = 32;
/// Length of the shared derivation context binding both public keys
pub const CONTEXT_LENGTH: usize = 6 + 2 * (2 + PUBLIC_KEY_LENGTH);

// The default record size of the encoding. No `rs` parameter is emitted,
// so a lone record must stay strictly below this.
const RECORD_SIZE: usize = 4096;

const CEK_INFO_PREFIX: &[u8] = b"Content-Encoding: aesgcm\0";
const NONCE_INFO_PREFIX: &[u8] = b"Content-Encoding: nonce\0";

/// Single-block HKDF-SHA256: extract with `salt`, then fill `okm` from the
/// first expansion block for `info`.
///
/// The `aesgcm` scheme never derives more than 32 bytes at once, so requests
/// for more than one block are rejected with [`Error::OkmLengthInvalid`]
/// instead of continuing the expansion.
pub fn derive<IKM: AsRef<[u8]>>(
    salt: &[u8],
    ikm: IKM,
    info: &[u8],
    okm: &mut [u8],
) -> Result<(), Error> {
    if okm.len() > MAX_OKM_LENGTH {
        return Err(Error::OkmLengthInvalid);
    }

    let hk = Hkdf::<Sha256>::new(Some(salt), ikm.as_ref());
    hk.expand(info, okm).map_err(|_| Error::OkmLengthInvalid)
}

/// Builds the derivation context shared by the content-encryption key and
/// nonce expansions.
///
/// Layout: the label `"P-256"`, a zero byte, then each public key prefixed
/// by its length as a 16-bit big-endian integer, recipient first.
pub fn derive_context(
    ua_public: &[u8; PUBLIC_KEY_LENGTH],
    as_public: &[u8; PUBLIC_KEY_LENGTH],
) -> [u8; CONTEXT_LENGTH] {
    let mut context = [0u8; CONTEXT_LENGTH];
    context[..6].copy_from_slice(b"P-256\0");
    context[6..8].copy_from_slice(&(PUBLIC_KEY_LENGTH as u16).to_be_bytes());
    context[8..73].copy_from_slice(ua_public);
    context[73..75].copy_from_slice(&(PUBLIC_KEY_LENGTH as u16).to_be_bytes());
    context[75..].copy_from_slice(as_public);

    context
}

fn derive_key<IKM: AsRef<[u8]>>(
    salt: [u8; SALT_LENGTH],
    ikm: IKM,
    context: &[u8; CONTEXT_LENGTH],
) -> aes_gcm::Key<Aes128Gcm> {
    let mut info = Vec::with_capacity(CEK_INFO_PREFIX.len() + CONTEXT_LENGTH);
    info.extend_from_slice(CEK_INFO_PREFIX);
    info.extend_from_slice(context);

    let mut okm = [0u8; 16];
    derive(&salt, ikm, &info, &mut okm)
        .expect("okm length is always 16, impossible for it to be too large");

    aes_gcm::Key::<Aes128Gcm>::from(okm)
}

fn derive_nonce<IKM: AsRef<[u8]>>(
    salt: [u8; SALT_LENGTH],
    ikm: IKM,
    context: &[u8; CONTEXT_LENGTH],
) -> Nonce<U12> {
    let mut info = Vec::with_capacity(NONCE_INFO_PREFIX.len() + CONTEXT_LENGTH);
    info.extend_from_slice(NONCE_INFO_PREFIX);
    info.extend_from_slice(context);

    let mut okm = [0u8; 12];
    derive(&salt, ikm, &info, &mut okm)
        .expect("okm length is always 12, impossible for it to be too large");

    Nonce::from(okm)
}

fn encrypt_record(
    key: &aes_gcm::Key<Aes128Gcm>,
    nonce: &Nonce<U12>,
    record: Vec<u8>,
) -> Result<Vec<u8>, Error> {
    let mut padded = Vec::with_capacity(PAD_LENGTH + record.len() + TAG_LENGTH);
    padded.extend_from_slice(&[0u8; PAD_LENGTH]);
    padded.extend_from_slice(&record);

    Aes128Gcm::new(key)
        .encrypt_in_place(nonce, b"", &mut padded)
        .map_err(|_| Error::Aes128Gcm)?;

    Ok(padded)
}

/// Low-level `aesgcm` encryption routine for a single record.
///
/// `ikm` is the pseudo-random key derived from the recipient's auth secret
/// and the ECDH shared secret. The record is prepended with a zeroed padding
/// length field and sealed with AES-128-GCM under a content-encryption key
/// and nonce bound to both public keys, the authentication tag appended.
pub fn encrypt<IKM: AsRef<[u8]>>(
    ikm: IKM,
    salt: [u8; SALT_LENGTH],
    ua_public: &[u8; PUBLIC_KEY_LENGTH],
    as_public: &[u8; PUBLIC_KEY_LENGTH],
    record: Vec<u8>,
) -> Result<Vec<u8>, Error> {
    if !(PAD_LENGTH + record.len() < RECORD_SIZE) {
        return Err(Error::RecordLengthInvalid);
    }

    let context = derive_context(ua_public, as_public);
    let key = derive_key(salt, ikm.as_ref(), &context);
    let nonce = derive_nonce(salt, ikm.as_ref(), &context);

    encrypt_record(&key, &nonce, record)
}
