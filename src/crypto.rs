//! Crypto collaborators consumed by the ownership workflow and the submit
//! pipeline: the session secret key, symmetric/asymmetric encryption and
//! the origin signature.

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use data_encoding::HEXLOWER_PERMISSIVE;
use ed25519_dalek::{Signer, SigningKey};
use rand::RngCore;
use sha2::{Digest, Sha256};
use x25519_dalek::{EphemeralSecret, PublicKey};

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("could not gather entropy for the session key")]
    Entropy,
    #[error("invalid key: expected {expected}")]
    InvalidKey { expected: &'static str },
    #[error("encryption failed")]
    EncryptionFailed,
}

/// Process-lifetime symmetric key. Ownership secrets are encrypted under it
/// and it is re-encrypted for each authorized public key.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Generates a fresh key. This is the one fatal startup path: without
    /// entropy the form cannot build ownerships.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = [0u8; 32];
        rand::rngs::OsRng
            .try_fill_bytes(&mut key)
            .map_err(|_| CryptoError::Entropy)?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Encrypts `plaintext` under the session key. Output: nonce || ciphertext.
pub fn symmetric_encrypt(plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, CryptoError> {
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::InvalidKey { expected: "32 byte key" })?;

    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::Entropy)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Encrypts `payload` for the holder of `public_key` using an ephemeral
/// x25519 exchange. Output: ephemeral pubkey || nonce || ciphertext.
///
/// The key may carry a two byte curve/origin header ahead of the 32 key
/// bytes; the header is ignored.
pub fn asymmetric_encrypt(payload: &[u8], public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key_bytes = strip_key_header(public_key)?;

    let ephemeral = EphemeralSecret::random_from_rng(rand::rngs::OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&PublicKey::from(key_bytes));

    let encryption_key = derive_key(shared.as_bytes(), ephemeral_public.as_bytes());
    let cipher = ChaCha20Poly1305::new_from_slice(&encryption_key)
        .map_err(|_| CryptoError::InvalidKey { expected: "32 byte key" })?;

    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::Entropy)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), payload)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(32 + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Signs `payload` with the origin key (hex, two byte header + 32 seed
/// bytes). Returns the 64 byte ed25519 signature.
pub fn origin_sign(payload: &[u8], origin_key_hex: &str) -> Result<Vec<u8>, CryptoError> {
    let decoded = HEXLOWER_PERMISSIVE
        .decode(origin_key_hex.as_bytes())
        .map_err(|_| CryptoError::InvalidKey { expected: "hex encoded origin key" })?;
    let seed = strip_key_header(&decoded)?;
    let signing_key = SigningKey::from_bytes(&seed);
    Ok(signing_key.sign(payload).to_bytes().to_vec())
}

fn strip_key_header(key: &[u8]) -> Result<[u8; 32], CryptoError> {
    let raw = match key.len() {
        32 => key,
        34 => &key[2..],
        _ => {
            return Err(CryptoError::InvalidKey {
                expected: "32 key bytes, optionally with a 2 byte header",
            });
        }
    };
    let mut out = [0u8; 32];
    out.copy_from_slice(raw);
    Ok(out)
}

fn derive_key(shared_secret: &[u8], ephemeral_public: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"aeform.ownership.v1");
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chacha20poly1305::aead::Aead;

    #[test]
    fn symmetric_round_trip() {
        let key = SecretKey::from_bytes([7u8; 32]);
        let sealed = symmetric_encrypt(b"the secret", &key).unwrap();

        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes()).unwrap();
        let plain = cipher
            .decrypt(Nonce::from_slice(&sealed[..NONCE_LEN]), &sealed[NONCE_LEN..])
            .unwrap();
        assert_eq!(plain, b"the secret");
    }

    #[test]
    fn asymmetric_round_trip() {
        let recipient_secret = x25519_dalek::StaticSecret::random_from_rng(rand::rngs::OsRng);
        let recipient_public = PublicKey::from(&recipient_secret);

        let sealed = asymmetric_encrypt(b"session key", recipient_public.as_bytes()).unwrap();

        let mut epk = [0u8; 32];
        epk.copy_from_slice(&sealed[..32]);
        let shared = recipient_secret.diffie_hellman(&PublicKey::from(epk));
        let key = derive_key(shared.as_bytes(), &epk);
        let cipher = ChaCha20Poly1305::new_from_slice(&key).unwrap();
        let plain = cipher
            .decrypt(
                Nonce::from_slice(&sealed[32..32 + NONCE_LEN]),
                &sealed[32 + NONCE_LEN..],
            )
            .unwrap();
        assert_eq!(plain, b"session key");
    }

    #[test]
    fn asymmetric_accepts_headered_key() {
        let secret = x25519_dalek::StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public = PublicKey::from(&secret);
        let mut headered = vec![0x01, 0x01];
        headered.extend_from_slice(public.as_bytes());
        assert!(asymmetric_encrypt(b"x", &headered).is_ok());
    }

    #[test]
    fn asymmetric_rejects_truncated_key() {
        let err = asymmetric_encrypt(b"x", &[0u8; 16]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey { .. }));
    }

    #[test]
    fn origin_signature_is_deterministic() {
        let sig1 = origin_sign(b"payload", crate::constants::ORIGIN_PRIVATE_KEY_HEX).unwrap();
        let sig2 = origin_sign(b"payload", crate::constants::ORIGIN_PRIVATE_KEY_HEX).unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
    }
}
