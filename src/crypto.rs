use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use argon2::{self, Argon2, Params};
use rand::RngCore;
use zeroize::Zeroize;

/// File header identifying an encrypted lunara snapshot.
const MAGIC: &[u8; 4] = b"LUNA";
const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed — wrong passphrase or corrupted data")]
    Decryption,
    #[error("not a lunara data file")]
    InvalidFormat,
}

/// Derive a 256-bit key from a passphrase and salt using Argon2id.
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    let params = Params::new(65536, 3, 1, Some(KEY_LEN)).map_err(|_| CryptoError::KeyDerivation)?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|_| CryptoError::KeyDerivation)?;

    Ok(key)
}

/// Encrypt a serialized snapshot with a passphrase.
///
/// Layout: `magic (4) || version (1) || salt (32) || nonce (12) ||
/// ciphertext`. The header is bound into the GCM tag as associated data,
/// so a wrong passphrase and a tampered header both surface as a
/// decryption failure.
pub fn encrypt(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut header = [0u8; HEADER_LEN];
    header[..MAGIC.len()].copy_from_slice(MAGIC);
    header[MAGIC.len()] = FORMAT_VERSION;

    let mut key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Encryption)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|_| CryptoError::Encryption)?;

    key.zeroize();

    let mut output = Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&header);
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt a snapshot produced by [`encrypt`].
pub fn decrypt(passphrase: &str, encrypted: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if encrypted.len() < HEADER_LEN + SALT_LEN + NONCE_LEN {
        return Err(CryptoError::InvalidFormat);
    }

    let (header, rest) = encrypted.split_at(HEADER_LEN);
    if &header[..MAGIC.len()] != MAGIC || header[MAGIC.len()] != FORMAT_VERSION {
        return Err(CryptoError::InvalidFormat);
    }

    let (salt, rest) = rest.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut key = derive_key(passphrase, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Decryption)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| CryptoError::Decryption)?;

    key.zeroize();

    Ok(plaintext)
}
