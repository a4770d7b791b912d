// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the Istio Sidecar CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_sidecar_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_sidecar_crd_exists(client).await {
            Ok(true) => {
                info!("Sidecar CRD (networking.istio.io/v1alpha3) is available");
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Sidecar CRD (networking.istio.io/v1alpha3) not yet available, waiting {} seconds...",
                    interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for Sidecar CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the Sidecar CRD exists by attempting to discover it.
async fn check_sidecar_crd_exists(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&["networking.istio.io"])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == "networking.istio.io" {
            for (ar, _) in group.recommended_resources() {
                if ar.kind == "Sidecar" && ar.version == "v1alpha3" {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
