// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Type definitions for the Istio resources this operator manages.

pub mod sidecar;

pub use sidecar::{EgressListener, Sidecar, SidecarSpec};
