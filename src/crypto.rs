//! Authenticated-encryption envelope: PBKDF2-HMAC-SHA256 key derivation,
//! optional gzip-wrapped deflate of the plaintext, AES-256-GCM, and the
//! versioned binary framing described alongside [`crate::payload`].
//!
//! Every failure path below — bad framing, KDF/AEAD failure, decompression
//! failure — returns the same [`StegoError::DecryptFailure`]. Distinguishing
//! them would let an attacker use the error channel as a padding oracle, so
//! this module never leaks which stage rejected the input.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::StegoError;

const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;
const KEY_LEN: usize = 32;
const ITERATIONS_DEFAULT: u32 = 100_000;
const ITERATIONS_HIGH_SECURITY: u32 = 310_000;

const FLAG_COMPRESSED: u8 = 0b01;
const FLAG_HIGH_SECURITY: u8 = 0b10;

#[derive(Debug, Clone, Copy)]
pub struct CryptoOptions
{
    pub high_security: bool,
    pub compress: bool,
}

struct DerivedKey([u8; KEY_LEN]);

impl Drop for DerivedKey
{
    fn drop(&mut self)
    {
        self.0.zeroize();
    }
}

fn derive_key(password: &str, salt: &[u8], high_security: bool) -> DerivedKey
{
    let iterations = if high_security { ITERATIONS_HIGH_SECURITY } else { ITERATIONS_DEFAULT };
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    DerivedKey(key)
}

/// Apply the optional pre-encryption compression stage on its own, so a
/// caller can learn the exact envelope size that `encrypt_body` will produce
/// — and therefore run the capacity precheck — without paying for key
/// derivation or AEAD first.
pub fn compress(plaintext: &[u8], compress: bool) -> Vec<u8>
{
    if compress
    {
        miniz_oxide::deflate::compress_to_vec_zlib(plaintext, 6)
    }
    else
    {
        plaintext.to_vec()
    }
}

/// Exact envelope length `encrypt_body` will produce for a (possibly
/// already-compressed) body of `body_len` bytes: flags + salt-length field +
/// salt + iv + ciphertext (body plus the 16-byte GCM tag).
pub fn envelope_len(body_len: usize) -> usize
{
    1 + 4 + SALT_LEN + IV_LEN + body_len + 16
}

/// Encrypt an already-compressed `body` under `password`, producing the
/// envelope byte layout: `[flags][salt len LE u32][salt][iv][ciphertext+tag]`.
/// `options.compress` only controls the flag bit written into the envelope —
/// the caller is responsible for having compressed `body` beforehand (see
/// [`compress`]) if that bit is set.
pub fn encrypt_body(body: &[u8], password: &str, options: &CryptoOptions) -> Result<Vec<u8>, StegoError>
{
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt, options.high_security);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let nonce = Nonce::from_slice(&iv);
    let ciphertext = cipher
        .encrypt(nonce, body)
        .map_err(|_| StegoError::DecryptFailure)?;

    let mut flags = 0u8;
    if options.compress
    {
        flags |= FLAG_COMPRESSED;
    }
    if options.high_security
    {
        flags |= FLAG_HIGH_SECURITY;
    }

    let mut envelope = Vec::with_capacity(1 + 4 + SALT_LEN + IV_LEN + ciphertext.len());
    envelope.push(flags);
    envelope.extend_from_slice(&(SALT_LEN as u32).to_le_bytes());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);

    log::debug!("crypto: encrypted a {}-byte body into a {}-byte envelope", body.len(), envelope.len());
    Ok(envelope)
}

/// Compress (if requested) and encrypt `plaintext` under `password` in one
/// call. Equivalent to `encrypt_body(&compress(plaintext, options.compress),
/// password, options)`; kept for callers that have no need to run the
/// capacity precheck between the two stages.
pub fn encrypt(plaintext: &[u8], password: &str, options: &CryptoOptions) -> Result<Vec<u8>, StegoError>
{
    let body = compress(plaintext, options.compress);
    encrypt_body(&body, password, options)
}

/// Decrypt an envelope produced by [`encrypt`]. Any malformed framing, bad
/// password, tampered ciphertext, or corrupt compressed stream surfaces as
/// the uniform [`StegoError::DecryptFailure`].
pub fn decrypt(envelope: &[u8], password: &str) -> Result<Vec<u8>, StegoError>
{
    if envelope.len() < 1 + 4 + SALT_LEN + IV_LEN + 16
    {
        return Err(StegoError::DecryptFailure);
    }

    let flags = envelope[0];
    let salt_len = u32::from_le_bytes(envelope[1..5].try_into().unwrap()) as usize;
    if salt_len != SALT_LEN
    {
        return Err(StegoError::DecryptFailure);
    }

    let salt_start = 5;
    let salt_end = salt_start + salt_len;
    let iv_end = salt_end + IV_LEN;
    if iv_end > envelope.len()
    {
        return Err(StegoError::DecryptFailure);
    }

    let salt = &envelope[salt_start..salt_end];
    let iv = &envelope[salt_end..iv_end];
    let ciphertext = &envelope[iv_end..];

    let high_security = flags & FLAG_HIGH_SECURITY != 0;
    let compressed = flags & FLAG_COMPRESSED != 0;

    let key = derive_key(password, salt, high_security);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let nonce = Nonce::from_slice(iv);
    let body = cipher.decrypt(nonce, ciphertext).map_err(|_| StegoError::DecryptFailure)?;

    let plaintext = if compressed
    {
        miniz_oxide::inflate::decompress_to_vec_zlib(&body).map_err(|_| StegoError::DecryptFailure)?
    }
    else
    {
        body
    };

    log::debug!("crypto: decrypted a {}-byte envelope into {} plaintext bytes", envelope.len(), plaintext.len());
    Ok(plaintext)
}
