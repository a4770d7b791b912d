// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::env;

use crate::constants::DEFAULT_EGRESS_HOST;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Egress hosts written into the default sidecar of opted-in namespaces
    pub egress_hosts: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let egress_hosts = env::var("EGRESS_HOSTS")
            .map(|v| {
                v.split(',')
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let egress_hosts = if egress_hosts.is_empty() {
            vec![DEFAULT_EGRESS_HOST.to_string()]
        } else {
            egress_hosts
        };

        Ok(Config { egress_hosts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults_to_istio_system() {
        // EGRESS_HOSTS is unset in the test environment
        let config = Config::from_env().unwrap();
        assert_eq!(config.egress_hosts, vec!["istio-system/*".to_string()]);
    }
}
