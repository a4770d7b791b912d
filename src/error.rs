// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LazyXdsError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Sidecar creation failed: {0}")]
    SidecarError(String),
}

pub type Result<T> = std::result::Result<T, LazyXdsError>;
