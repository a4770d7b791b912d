// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and sidecar provisioning.

pub mod crd;
pub mod sidecar;

pub use crd::wait_for_sidecar_crd;
pub use sidecar::ensure_default_sidecar;
