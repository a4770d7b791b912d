// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Default sidecar provisioning for opted-in namespaces

use crate::constants::{DEFAULT_SIDECAR_NAME, OPERATOR_NAME};
use crate::error::{LazyXdsError, Result};
use crate::types::{EgressListener, Sidecar, SidecarSpec};
use kube::{api::PostParams, Api, Client};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Ensure the default sidecar exists in a namespace, create if it doesn't.
/// Already-exists responses from the API server count as success so that
/// concurrent reconciles for the same namespace never surface an error.
#[instrument(skip(client, egress_hosts))]
pub async fn ensure_default_sidecar(
    client: &Client,
    namespace: &str,
    egress_hosts: &[String],
) -> Result<()> {
    let sidecars: Api<Sidecar> = Api::namespaced(client.clone(), namespace);

    match sidecars.get(DEFAULT_SIDECAR_NAME).await {
        Ok(_) => {
            debug!("Default sidecar already exists in namespace {}", namespace);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            info!("Creating default sidecar in namespace {}", namespace);
            let sidecar = default_sidecar(namespace, egress_hosts);
            match sidecars.create(&PostParams::default(), &sidecar).await {
                Ok(_) => {
                    info!("Default sidecar created in namespace {}", namespace);
                    Ok(())
                }
                Err(kube::Error::Api(err)) if err.code == 409 => {
                    // Lost the creation race to a concurrent reconcile
                    debug!(
                        "Default sidecar concurrently created in namespace {}",
                        namespace
                    );
                    Ok(())
                }
                Err(e) => Err(LazyXdsError::SidecarError(format!(
                    "Failed to create default sidecar in namespace {}: {}",
                    namespace, e
                ))),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Build the default sidecar for a namespace
fn default_sidecar(namespace: &str, egress_hosts: &[String]) -> Sidecar {
    let mut sidecar = Sidecar::new(
        DEFAULT_SIDECAR_NAME,
        SidecarSpec {
            egress: Some(vec![EgressListener {
                hosts: egress_hosts.to_vec(),
            }]),
        },
    );
    sidecar.metadata.namespace = Some(namespace.to_string());
    sidecar.metadata.labels = Some(BTreeMap::from([(
        "app.kubernetes.io/managed-by".to_string(),
        OPERATOR_NAME.to_string(),
    )]));
    sidecar
}
