//! RSA keypair management and password decryption.
//!
//! The control plane encrypts every database user password with this
//! agent's public key (RSA-OAEP-SHA256) before it ever leaves the control
//! plane's side, so plaintext credentials never cross the wire. The
//! decrypted buffer has the shape `plaintext || 32-byte tail` — the tail is
//! the OAEP label hash, not part of the password, and is discarded.

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

const KEY_BITS: usize = 2048;
const OAEP_TAIL_LEN: usize = 32; // sha256::Sha256::output_size()

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to read private key file {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to write private key file {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("failed to set permissions on private key file {path}: {source}")]
    Permissions { path: String, source: io::Error },

    #[error("failed to generate RSA keypair: {0}")]
    Generate(#[source] rsa::errors::Error),

    #[error("failed to parse private key PEM: {0}")]
    ParsePrivate(#[source] rsa::pkcs1::Error),

    #[error("failed to encode private key PEM: {0}")]
    EncodePrivate(#[source] rsa::pkcs1::Error),

    #[error("failed to encode public key DER: {0}")]
    EncodePublic(#[source] rsa::pkcs1::Error),

    #[error("failed to encode public key PEM: {0}")]
    EncodePublicPem(#[from] pem::PemError),
}

#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("invalid base64 ciphertext: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("RSA-OAEP decryption failed: {0}")]
    Rsa(#[source] rsa::errors::Error),

    #[error("decrypted payload shorter than the OAEP tail")]
    TooShort,
}

/// Reads the private key at `path`, generating and persisting a fresh
/// 2048-bit keypair (mode 0600) if none exists yet.
pub fn read_or_generate_private_key(path: &Path) -> Result<RsaPrivateKey, KeyError> {
    if path.exists() {
        read_private_key(path)
    } else {
        generate_and_write_private_key(path)
    }
}

pub fn read_private_key(path: &Path) -> Result<RsaPrivateKey, KeyError> {
    let pem = fs::read_to_string(path).map_err(|source| KeyError::Read {
        path: path.display().to_string(),
        source,
    })?;
    RsaPrivateKey::from_pkcs1_pem(&pem).map_err(KeyError::ParsePrivate)
}

pub fn generate_and_write_private_key(path: &Path) -> Result<RsaPrivateKey, KeyError> {
    tracing::info!("generating an RSA private key at {}", path.display());
    let mut rng = rand_core::OsRng;
    let key = RsaPrivateKey::new(&mut rng, KEY_BITS).map_err(KeyError::Generate)?;

    let pem = key
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .map_err(KeyError::EncodePrivate)?;

    fs::write(path, pem.as_bytes()).map_err(|source| KeyError::Write {
        path: path.display().to_string(),
        source,
    })?;

    set_owner_only_permissions(path)?;

    Ok(key)
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), KeyError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|source| {
        KeyError::Permissions {
            path: path.display().to_string(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), KeyError> {
    Ok(())
}

/// Encodes the public half of `key` as a PEM block of type `PUBLIC KEY`
/// wrapping the PKCS#1 `RSAPublicKey` DER sequence. The `PUBLIC KEY` label
/// is non-standard for this DER layout (SubjectPublicKeyInfo normally owns
/// that label) but matches what the control plane expects, since it mirrors
/// the original agent's `asn1.Marshal(rsa.PublicKey{N, E})` output.
pub fn encode_public_key(key: &RsaPrivateKey) -> Result<Vec<u8>, KeyError> {
    let public = RsaPublicKey::from(key);
    let der = public.to_pkcs1_der().map_err(KeyError::EncodePublic)?;
    let block = pem::Pem::new("PUBLIC KEY", der.as_bytes().to_vec());
    Ok(pem::encode(&block).into_bytes())
}

/// Base64-decodes `ciphertext`, decrypts it with RSA-OAEP-SHA256, and
/// strips the trailing 32-byte OAEP label hash, returning the plaintext
/// password.
pub fn decrypt_password(key: &RsaPrivateKey, ciphertext_b64: &str) -> Result<String, DecryptError> {
    let ciphertext = BASE64.decode(ciphertext_b64)?;
    let padding = Oaep::new::<Sha256>();
    let decrypted = key.decrypt(padding, &ciphertext).map_err(DecryptError::Rsa)?;
    if decrypted.len() < OAEP_TAIL_LEN {
        return Err(DecryptError::TooShort);
    }
    let plaintext_len = decrypted.len() - OAEP_TAIL_LEN;
    Ok(String::from_utf8_lossy(&decrypted[..plaintext_len]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> RsaPrivateKey {
        let mut rng = rand_core::OsRng;
        RsaPrivateKey::new(&mut rng, 2048).unwrap()
    }

    // Simulates what the control plane does: OAEP-SHA256 encrypt
    // `plaintext || tail`, where `tail` is a random 32-byte value matching
    // the shape this agent expects to discard.
    fn encrypt_with_tail(public: &RsaPublicKey, plaintext: &str, tail: &[u8; 32]) -> String {
        let mut rng = rand_core::OsRng;
        let mut payload = plaintext.as_bytes().to_vec();
        payload.extend_from_slice(tail);
        let padding = Oaep::new::<Sha256>();
        let ciphertext = public.encrypt(&mut rng, padding, &payload).unwrap();
        BASE64.encode(ciphertext)
    }

    #[test]
    fn decrypt_strips_oaep_tail() {
        let key = test_key();
        let public = RsaPublicKey::from(&key);
        let tail = [7u8; 32];
        let b64 = encrypt_with_tail(&public, "foobar1234", &tail);

        let decrypted = decrypt_password(&key, &b64).unwrap();
        assert_eq!(decrypted, "foobar1234");
    }

    #[test]
    fn decrypt_rejects_invalid_base64() {
        let key = test_key();
        let err = decrypt_password(&key, "not valid base64!!").unwrap_err();
        assert!(matches!(err, DecryptError::Base64(_)));
    }

    #[test]
    fn public_key_pem_has_expected_label() {
        let key = test_key();
        let pem_bytes = encode_public_key(&key).unwrap();
        let pem_str = String::from_utf8(pem_bytes).unwrap();
        assert!(pem_str.starts_with("-----BEGIN PUBLIC KEY-----"));
    }
}
