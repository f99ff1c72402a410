//! Anonymous sealed-box encryption for repository secrets.
//!
//! Protocol: ephemeral X25519 key exchange → HKDF-SHA256 key + nonce
//! derivation → ChaCha20-Poly1305 AEAD.
//!
//! The sealer holds no persistent key pair: a fresh ephemeral keypair is
//! generated per call and the ephemeral secret is consumed by the
//! Diffie-Hellman, so the plaintext cannot be re-derived after `seal`
//! returns. Only the holder of the recipient's secret key can open the
//! result.
//!
//! HKDF inputs (salt = `epk || rpk`, binding the ciphertext to both keys):
//!   key   (info = "overture-seal-key-v1"):   32-byte ChaCha20-Poly1305 key
//!   nonce (info = "overture-seal-nonce-v1"): 12-byte nonce
//!
//! Wire format: `base64( epk_32 || ciphertext )`, standard alphabet — the
//! form the repository host's secrets API accepts.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use hkdf::Hkdf;
use rand_core::OsRng;
use sha2::Sha256;
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

const KEY_INFO: &[u8] = b"overture-seal-key-v1";
const NONCE_INFO: &[u8] = b"overture-seal-nonce-v1";

/// Errors from the sealing boundary. Both variants are configuration errors
/// and terminal — there is nothing to retry.
#[derive(Debug, Error)]
pub enum SealError {
    /// The recipient public key was empty, not base64, or not 32 bytes.
    #[error("invalid recipient public key: {0}")]
    InvalidRecipientKey(String),

    /// A sealed payload (or AEAD input) was structurally invalid.
    #[error("malformed sealed payload: {0}")]
    MalformedInput(String),
}

/// Seal `plaintext` against the recipient's base64-encoded X25519 public key.
///
/// Returns the base64 sealed payload. Each call draws a fresh ephemeral
/// keypair, so sealing the same plaintext twice yields different
/// ciphertexts.
pub fn seal(recipient_public_key_b64: &str, plaintext: &[u8]) -> Result<String, SealError> {
    let recipient_pk = decode_public_key(recipient_public_key_b64)?;

    let ephemeral_sk = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_pk = PublicKey::from(&ephemeral_sk);
    let shared = ephemeral_sk.diffie_hellman(&recipient_pk);

    let (cipher, nonce) = derive_cipher(shared.as_bytes(), &ephemeral_pk, &recipient_pk)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| SealError::MalformedInput("AEAD encrypt failed".to_string()))?;

    let mut payload = ephemeral_pk.as_bytes().to_vec();
    payload.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(payload))
}

/// Open a sealed payload with the recipient's secret key.
///
/// This is the recipient side of the protocol; the sealing boundary itself
/// never holds the secret key, so it cannot call this on its own output.
pub fn open(recipient_secret_key: &StaticSecret, sealed_b64: &str) -> Result<Vec<u8>, SealError> {
    let payload = STANDARD
        .decode(sealed_b64)
        .map_err(|e| SealError::MalformedInput(format!("payload is not base64: {e}")))?;
    if payload.len() < 32 {
        return Err(SealError::MalformedInput(
            "payload shorter than an ephemeral public key".to_string(),
        ));
    }
    let (epk_bytes, ciphertext) = payload.split_at(32);
    let epk_array: [u8; 32] = epk_bytes
        .try_into()
        .map_err(|_| SealError::MalformedInput("ephemeral key must be 32 bytes".to_string()))?;
    let ephemeral_pk = PublicKey::from(epk_array);
    let recipient_pk = PublicKey::from(recipient_secret_key);

    let shared = recipient_secret_key.diffie_hellman(&ephemeral_pk);
    let (cipher, nonce) = derive_cipher(shared.as_bytes(), &ephemeral_pk, &recipient_pk)?;

    cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|_| SealError::MalformedInput("AEAD decrypt failed".to_string()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode_public_key(key_b64: &str) -> Result<PublicKey, SealError> {
    if key_b64.is_empty() {
        return Err(SealError::InvalidRecipientKey("key is empty".to_string()));
    }
    let raw = STANDARD
        .decode(key_b64)
        .map_err(|e| SealError::InvalidRecipientKey(format!("not base64: {e}")))?;
    let bytes: [u8; 32] = raw
        .try_into()
        .map_err(|_| SealError::InvalidRecipientKey("key must be 32 bytes".to_string()))?;
    Ok(PublicKey::from(bytes))
}

fn derive_cipher(
    shared: &[u8],
    ephemeral_pk: &PublicKey,
    recipient_pk: &PublicKey,
) -> Result<(ChaCha20Poly1305, [u8; 12]), SealError> {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(ephemeral_pk.as_bytes());
    salt[32..].copy_from_slice(recipient_pk.as_bytes());

    let hk = Hkdf::<Sha256>::new(Some(&salt), shared);
    let mut key = [0u8; 32];
    hk.expand(KEY_INFO, &mut key)
        .map_err(|_| SealError::MalformedInput("HKDF key expand failed".to_string()))?;
    let mut nonce = [0u8; 12];
    hk.expand(NONCE_INFO, &mut nonce)
        .map_err(|_| SealError::MalformedInput("HKDF nonce expand failed".to_string()))?;

    Ok((ChaCha20Poly1305::new(Key::from_slice(&key)), nonce))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient_keypair() -> (StaticSecret, String) {
        let sk = StaticSecret::random_from_rng(OsRng);
        let pk_b64 = STANDARD.encode(PublicKey::from(&sk).as_bytes());
        (sk, pk_b64)
    }

    #[test]
    fn seal_then_open_round_trips() {
        let (sk, pk_b64) = recipient_keypair();
        let sealed = seal(&pk_b64, b"vercel-token-abc123").expect("seal");
        let opened = open(&sk, &sealed).expect("open");
        assert_eq!(opened, b"vercel-token-abc123");
    }

    #[test]
    fn sealing_twice_yields_distinct_ciphertexts() {
        let (_, pk_b64) = recipient_keypair();
        let first = seal(&pk_b64, b"same plaintext").expect("seal");
        let second = seal(&pk_b64, b"same plaintext").expect("seal");
        assert_ne!(first, second, "ephemeral keys must differ per call");
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = seal("", b"data").expect_err("should fail");
        assert!(matches!(err, SealError::InvalidRecipientKey(_)));
    }

    #[test]
    fn non_base64_key_is_rejected() {
        let err = seal("not-base-64!!!", b"data").expect_err("should fail");
        assert!(matches!(err, SealError::InvalidRecipientKey(_)));
    }

    #[test]
    fn wrong_length_key_is_rejected() {
        let short = STANDARD.encode([1u8; 16]);
        let err = seal(&short, b"data").expect_err("should fail");
        assert!(matches!(err, SealError::InvalidRecipientKey(_)));
    }

    #[test]
    fn wrong_recipient_cannot_open() {
        let (_, pk_b64) = recipient_keypair();
        let (other_sk, _) = recipient_keypair();
        let sealed = seal(&pk_b64, b"secret").expect("seal");
        let err = open(&other_sk, &sealed).expect_err("wrong key must fail");
        assert!(matches!(err, SealError::MalformedInput(_)));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let (sk, _) = recipient_keypair();
        let err = open(&sk, &STANDARD.encode([0u8; 16])).expect_err("should fail");
        assert!(matches!(err, SealError::MalformedInput(_)));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let (sk, pk_b64) = recipient_keypair();
        let sealed = seal(&pk_b64, b"secret").expect("seal");
        let mut raw = STANDARD.decode(&sealed).expect("decode");
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let err = open(&sk, &STANDARD.encode(raw)).expect_err("tamper must fail");
        assert!(matches!(err, SealError::MalformedInput(_)));
    }

    #[test]
    fn empty_plaintext_still_seals() {
        // The propagator skips empty secrets; the boundary itself stays total.
        let (sk, pk_b64) = recipient_keypair();
        let sealed = seal(&pk_b64, b"").expect("seal");
        assert_eq!(open(&sk, &sealed).expect("open"), b"");
    }
}
