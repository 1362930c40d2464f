//! # Credential Generation
//!
//! Random password generation and the Secret that persists it.

use crate::constants::{APP_LABEL, PASSWORD_BYTES, PASSWORD_KEY, SECRET_NAME_SUFFIX};
use crate::controller::reconciler::types::{ObjectKey, ReconcilerError};
use crate::crd::Redis;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::Resource;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::BTreeMap;
use zeroize::Zeroizing;

/// Name of the credential Secret of a `Redis`
#[must_use]
pub fn credential_secret_name(redis_name: &str) -> String {
    format!("{redis_name}{SECRET_NAME_SUFFIX}")
}

/// Generate a password from the operating system's entropy source
///
/// # Errors
///
/// Returns [`ReconcilerError::CredentialGeneration`] when the entropy source fails.
pub fn generate_password() -> Result<Zeroizing<String>, ReconcilerError> {
    generate_password_with(&mut OsRng)
}

/// Generate a password from `rng`: 16 random bytes rendered as URL-safe base64
///
/// # Errors
///
/// Returns [`ReconcilerError::CredentialGeneration`] when `rng` cannot fill the buffer.
pub fn generate_password_with<R: RngCore + ?Sized>(
    rng: &mut R,
) -> Result<Zeroizing<String>, ReconcilerError> {
    let mut bytes = Zeroizing::new([0u8; PASSWORD_BYTES]);
    rng.try_fill_bytes(&mut bytes[..])
        .map_err(ReconcilerError::CredentialGeneration)?;
    Ok(Zeroizing::new(URL_SAFE.encode(&bytes[..])))
}

/// Labels shared by every object the operator creates for one `Redis`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLabels {
    pub app: String,
}

impl AppLabels {
    #[must_use]
    pub fn for_redis(key: &ObjectKey) -> Self {
        Self {
            app: key.name.clone(),
        }
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(APP_LABEL.to_string(), self.app.clone())])
    }
}

/// Build the credential Secret for `redis`
///
/// The stored value is the standard base64 text of `password`, so the API
/// server holds it base64-encoded twice. The Secret is owned by `redis` when
/// the object carries a uid.
#[must_use]
pub fn build_credential_secret(redis: &Redis, key: &ObjectKey, password: &str) -> Secret {
    let data = BTreeMap::from([(
        PASSWORD_KEY.to_string(),
        ByteString(STANDARD.encode(password.as_bytes()).into_bytes()),
    )]);

    Secret {
        metadata: ObjectMeta {
            name: Some(credential_secret_name(&key.name)),
            namespace: Some(key.namespace.clone()),
            labels: Some(AppLabels::for_redis(key).to_map()),
            owner_references: redis.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..ObjectMeta::default()
        },
        data: Some(data),
        ..Secret::default()
    }
}
