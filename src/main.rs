// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};

use lazyxds::config::Config;
use lazyxds::kubernetes::wait_for_sidecar_crd;
use lazyxds::reconcilers::NamespaceReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting lazyxds operator");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: egress_hosts={:?}", config.egress_hosts);

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the Istio Sidecar CRD before starting the reconciler
    info!("Waiting for Istio Sidecar CRD to become available...");
    wait_for_sidecar_crd(&client).await?;

    info!("Starting namespace reconciler...");

    let reconciler = NamespaceReconciler::new(client, config);
    reconciler.run().await?;

    // This should never be reached as the reconciler runs forever
    warn!("Namespace reconciler stopped unexpectedly");
    Ok(())
}
