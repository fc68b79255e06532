// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Instance identity and canonical signing.
//!
//! One P-256 keypair per instance, loaded in priority order: database
//! row, on-disk PEM, fresh generation. Whenever the key did not come
//! from the database it is synced back to both the database and the
//! disk backup (mode 0600). Key material never leaves the process in
//! any other form.
//!
//! Signatures are ECDSA over SHA-256, serialized as raw R||S with each
//! half padded to 32 bytes and hex-encoded, never ASN.1.

use std::sync::{Arc, RwLock};

use config::utils::json;
use infra::{
    errors::{self, HttpError},
    table,
};
use once_cell::sync::Lazy;
use p256::{
    SecretKey,
    ecdsa::{Signature, SigningKey, VerifyingKey, signature::Signer, signature::Verifier},
    pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding},
};

pub mod connect;

struct Identity {
    signing_key: SigningKey,
    public_key_pem: String,
}

// read-mostly: every signature takes the read side, the write side is
// only held during startup load or a forced rotation
static IDENTITY: Lazy<RwLock<Option<Arc<Identity>>>> = Lazy::new(|| RwLock::new(None));

fn identity_file_path() -> std::path::PathBuf {
    std::path::Path::new(&config::get_config().common.data_dir).join("identity.key")
}

/// Load or create the instance keypair
pub async fn init() -> Result<(), errors::Error> {
    let cfg = config::get_config();
    let instance_id = &cfg.common.instance_id;

    // (a) database row
    if let Some(row) = table::instance_identity::get(instance_id).await? {
        match SecretKey::from_pkcs8_pem(&row.private_key_pem) {
            Ok(secret) => {
                install(&secret, row.public_key_pem);
                log::info!("[IDENTITY] loaded keypair for instance {instance_id} from database");
                return Ok(());
            }
            Err(e) => {
                log::warn!("[IDENTITY] database keypair for {instance_id} is corrupt: {e}");
            }
        }
    }

    // (b) on-disk PEM
    let path = identity_file_path();
    if let Ok(pem) = std::fs::read_to_string(&path)
        && let Ok(secret) = SecretKey::from_pkcs8_pem(&pem)
    {
        let public_pem = persist(instance_id, &secret).await?;
        install(&secret, public_pem);
        log::info!(
            "[IDENTITY] loaded keypair for instance {instance_id} from {}",
            path.display()
        );
        return Ok(());
    }

    // (c) fresh generation
    let secret = generate_secret();
    let public_pem = persist(instance_id, &secret).await?;
    install(&secret, public_pem);
    log::info!("[IDENTITY] generated new keypair for instance {instance_id}");
    Ok(())
}

fn install(secret: &SecretKey, public_key_pem: String) {
    let identity = Identity {
        signing_key: SigningKey::from(secret),
        public_key_pem,
    };
    *IDENTITY.write().expect("identity lock poisoned") = Some(Arc::new(identity));
}

fn generate_secret() -> SecretKey {
    use rand::Rng;
    let mut rng = rand::rng();
    loop {
        let bytes: [u8; 32] = rng.random();
        // a 32-byte value can fall outside the curve order
        if let Ok(secret) = SecretKey::from_slice(&bytes) {
            return secret;
        }
    }
}

/// Sync the keypair to the database and the on-disk backup, returning
/// the public PEM
async fn persist(instance_id: &str, secret: &SecretKey) -> Result<String, errors::Error> {
    let private_pem = secret
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| HttpError::Internal(format!("private key encode error: {e}")))?;
    let public_pem = secret
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| HttpError::Internal(format!("public key encode error: {e}")))?;

    table::instance_identity::upsert(instance_id, &private_pem, &public_pem).await?;

    let path = identity_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, private_pem.as_bytes())?;
    set_owner_only(&path)?;

    Ok(public_pem)
}

#[cfg(unix)]
fn set_owner_only(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_owner_only(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

fn current() -> Result<Arc<Identity>, errors::Error> {
    IDENTITY
        .read()
        .expect("identity lock poisoned")
        .clone()
        .ok_or_else(|| HttpError::Internal("instance identity not initialized".to_string()).into())
}

/// Hex-encoded raw R||S signature, always 128 characters for P-256
pub fn sign(message: &[u8]) -> Result<String, errors::Error> {
    let identity = current()?;
    let signature: Signature = identity.signing_key.sign(message);
    Ok(hex::encode(signature.to_bytes()))
}

/// Sign the canonical JSON form of a structured value
pub fn sign_canonical(value: &json::Value) -> Result<String, errors::Error> {
    sign(json::canonical_string(value).as_bytes())
}

pub fn public_key_pem() -> Result<String, errors::Error> {
    Ok(current()?.public_key_pem.clone())
}

/// Verify a raw R||S hex signature produced by this instance
pub fn verify(message: &[u8], signature_hex: &str) -> Result<bool, errors::Error> {
    let identity = current()?;
    let bytes = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };
    let Ok(signature) = Signature::from_slice(&bytes) else {
        return Ok(false);
    };
    let verifying_key = VerifyingKey::from(&identity.signing_key);
    Ok(verifying_key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // the identity is a process-wide singleton, keep key-swapping tests
    // from interleaving
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn install_fresh_key() {
        let secret = generate_secret();
        let public_pem = secret
            .public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        install(&secret, public_pem);
    }

    #[test]
    fn test_signature_shape() {
        let _guard = TEST_LOCK.lock().unwrap();
        install_fresh_key();
        let signature = sign(b"pairing payload").unwrap();
        assert_eq!(signature.len(), 128);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let _guard = TEST_LOCK.lock().unwrap();
        install_fresh_key();
        let message = b"some bytes to sign";
        let signature = sign(message).unwrap();
        assert!(verify(message, &signature).unwrap());
        assert!(!verify(b"different bytes", &signature).unwrap());
        assert!(!verify(message, "deadbeef").unwrap());
    }

    #[test]
    fn test_canonical_signing_is_order_insensitive() {
        let _guard = TEST_LOCK.lock().unwrap();
        install_fresh_key();
        let a = json::json!({"b": 1, "a": {"y": 2.0, "x": "s"}});
        let b = json::json!({"a": {"x": "s", "y": 2}, "b": 1});
        // same canonical form, so either serialization verifies
        let signature = sign_canonical(&a).unwrap();
        let canonical_b = json::canonical_string(&b);
        assert!(verify(canonical_b.as_bytes(), &signature).unwrap());
    }

    #[test]
    fn test_pem_roundtrip() {
        let secret = generate_secret();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();
        let parsed = SecretKey::from_pkcs8_pem(&pem).unwrap();
        assert_eq!(secret.to_bytes(), parsed.to_bytes());
    }
}
