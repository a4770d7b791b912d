// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// The Istio Sidecar resource, reduced to the surface this operator writes.
/// The CRD itself is owned by Istio; we only ever create instances of it.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "networking.istio.io", version = "v1alpha3", kind = "Sidecar")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct SidecarSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress: Option<Vec<EgressListener>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EgressListener {
    pub hosts: Vec<String>,
}
