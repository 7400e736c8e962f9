//! Encryption of small files with a key derived from a configured secret.
//!
//! The key is derived with Argon2 from the secret and a random salt; the
//! payload is sealed with ChaCha20-Poly1305 under a random nonce.

use anyhow::{anyhow, bail, Result};
use argon2::Argon2;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedBox {
    pub version: u8,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

fn derive_key(secret: &str, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), salt, &mut key)
        .map_err(|e| anyhow!("Failed to derive key: {}", e))?;
    Ok(key)
}

pub fn seal(secret: &str, plaintext: &[u8]) -> Result<SealedBox> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_key(secret, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| anyhow!("Failed to encrypt: {}", e))?;

    Ok(SealedBox {
        version: FORMAT_VERSION,
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

pub fn open(secret: &str, sealed: &SealedBox) -> Result<Vec<u8>> {
    if sealed.version != FORMAT_VERSION {
        bail!("Unsupported sealed format version {}", sealed.version);
    }
    if sealed.nonce.len() != NONCE_LEN {
        bail!("Malformed nonce");
    }

    let key = derive_key(secret, &sealed.salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| anyhow!("Failed to decrypt: wrong secret or corrupted data"))
}
