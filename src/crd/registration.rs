//! # CRD Registration
//!
//! One-time startup step that binds the `Redis` type to the API server.
//!
//! Nothing is registered when the type is defined; `register` must be called
//! explicitly during startup before the watch loop starts. Later calls return
//! the first result without touching the API server again.

use super::Redis;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, PostParams};
use kube::core::CustomResourceExt;
use kube::Client;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

static REGISTERED: OnceCell<()> = OnceCell::const_new();

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("CRD {0} is not installed (set INSTALL_CRD=true or apply the crdgen output)")]
    NotInstalled(&'static str),
    #[error("failed to query CRD {name}: {source}")]
    Kube {
        name: &'static str,
        #[source]
        source: kube::Error,
    },
}

/// Ensure the `Redis` CRD is served, installing it when `install` is set
///
/// # Errors
///
/// Returns an error when the CRD is missing and `install` is false, or when
/// the API server cannot be queried.
pub async fn register(client: &Client, install: bool) -> Result<(), RegistrationError> {
    REGISTERED
        .get_or_try_init(|| ensure_crd(client, install))
        .await
        .map(|_| ())
}

async fn ensure_crd(client: &Client, install: bool) -> Result<(), RegistrationError> {
    let name = Redis::crd_name();
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());

    let existing = crds
        .get_opt(name)
        .await
        .map_err(|source| RegistrationError::Kube { name, source })?;
    if existing.is_some() {
        info!(crd = name, "CRD is registered");
        return Ok(());
    }

    if !install {
        return Err(RegistrationError::NotInstalled(name));
    }

    warn!(crd = name, "CRD not found, installing it");
    match crds.create(&PostParams::default(), &Redis::crd()).await {
        Ok(_) => {}
        // Another replica won the race
        Err(kube::Error::Api(api_err)) if api_err.code == 409 => {}
        Err(source) => return Err(RegistrationError::Kube { name, source }),
    }
    info!(crd = name, "CRD installed");
    Ok(())
}
