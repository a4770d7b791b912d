// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by lazyxds
pub mod annotations {
    /// When set to "true", enables lazy xDS delivery for the namespace
    pub const LAZY_XDS: &str = "lazy-xds";
}

/// The operator name used for managed-by labels
pub const OPERATOR_NAME: &str = "lazyxds";

/// Name of the default sidecar created in opted-in namespaces
pub const DEFAULT_SIDECAR_NAME: &str = "lazyxds-default";

/// Egress host used when EGRESS_HOSTS is not configured
pub const DEFAULT_EGRESS_HOST: &str = "istio-system/*";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
