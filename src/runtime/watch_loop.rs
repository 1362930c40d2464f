//! # Watch Loop
//!
//! Runs the kube-runtime controller for `Redis` resources. Deployments and
//! Secrets owned by a `Redis` are watched too, so a change to either routes
//! back to the owning `Redis`.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::Redis;
use crate::runtime::error_policy::{handle_reconciliation_error, log_controller_stream_error};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::Client;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller watch loop
///
/// Restarts the controller when its stream ends on its own and returns once a
/// shutdown signal was received.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for startup checks.
pub async fn run_watch_loop(
    client: Client,
    redis_api: Api<Redis>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let watch_namespace = reconciler.config.watch_namespace.clone();
    let restart_delay = reconciler.config.watch_restart_delay_duration();

    // Readiness drops as soon as a shutdown signal arrives
    let shutdown_server_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal, initiating graceful shutdown...");
        shutdown_server_state.set_ready(false);
        info!("Marked server as not ready, waiting for in-flight reconciliations to complete...");
    });

    loop {
        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let deployments: Api<Deployment> = scoped_api(&client, watch_namespace.as_deref());
        let secrets: Api<Secret> = scoped_api(&client, watch_namespace.as_deref());

        info!("Starting controller watch loop...");
        Controller::new(redis_api.clone(), watcher::Config::default().any_semantic())
            .owns(deployments, watcher::Config::default())
            .owns(secrets, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile, handle_reconciliation_error, Arc::clone(&reconciler))
            .for_each(|result| async move {
                match result {
                    Ok((obj_ref, action)) => {
                        debug!(object = %obj_ref, ?action, "Reconciled object");
                    }
                    Err(err) => log_controller_stream_error(&err),
                }
            })
            .await;

        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        warn!(
            "Controller watch stream ended, restarting in {} seconds...",
            restart_delay.as_secs()
        );
        tokio::time::sleep(restart_delay).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    <K as kube::Resource>::DynamicType: Default,
{
    match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
