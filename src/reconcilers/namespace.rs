// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - watches namespaces and provisions the default
//! sidecar for those that opt into lazy xDS delivery.

use crate::config::Config;
use crate::constants::annotations;
use crate::error::{LazyXdsError, Result};
use crate::kubernetes::ensure_default_sidecar;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct NamespaceReconciler {
    client: Client,
    config: Config,
}

impl NamespaceReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(namespaces, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled namespace: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(ns: Arc<Namespace>, ctx: Arc<NamespaceReconciler>) -> Result<Action> {
    let name = ns.name_any();

    debug!("Reconciling namespace: {}", name);

    // Watch events may be coalesced, replayed, or stale, so the event object
    // is trusted only for its name. Every decision is made against live state.
    let namespaces: Api<Namespace> = Api::all(ctx.client.clone());
    let namespace = match namespaces.get(&name).await {
        Ok(ns) => ns,
        Err(kube::Error::Api(err)) if err.code == 404 => {
            // Deleted between event and processing; nothing to clean up
            debug!("Namespace {} no longer exists, skipping", name);
            return Ok(Action::await_change());
        }
        Err(e) => return Err(e.into()),
    };

    if !is_lazy_xds_enabled(&namespace) {
        debug!("Namespace {} has not opted into lazy xDS, skipping", name);
        return Ok(Action::await_change());
    }

    info!("Ensuring default sidecar for namespace {}", name);
    ensure_default_sidecar(&ctx.client, &name, &ctx.config.egress_hosts).await?;

    Ok(Action::await_change())
}

/// Check if a namespace has the lazy xDS annotation set to "true".
/// The match is exact: any other value, including absence, opts out.
pub fn is_lazy_xds_enabled(ns: &Namespace) -> bool {
    ns.metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::LAZY_XDS))
        .is_some_and(|v| v == "true")
}

fn error_policy(
    _ns: Arc<Namespace>,
    error: &LazyXdsError,
    _ctx: Arc<NamespaceReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{internal_error_json, namespace_json, sidecar_json, MockService};
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    const NAMESPACES_PATH: &str = "/api/v1/namespaces";
    const SIDECARS_PATH: &str = "/apis/networking.istio.io/v1alpha3/namespaces/team-a/sidecars";

    fn make_namespace(name: &str, annotations: Option<BTreeMap<String, String>>) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn lazy_xds_annotations(value: &str) -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            annotations::LAZY_XDS.to_string(),
            value.to_string(),
        )]))
    }

    fn make_context(mock: &MockService) -> Arc<NamespaceReconciler> {
        let config = Config {
            egress_hosts: vec!["istio-system/*".to_string()],
        };
        Arc::new(NamespaceReconciler::new(mock.clone().into_client(), config))
    }

    #[test]
    fn test_is_lazy_xds_enabled_true() {
        let ns = make_namespace("team-a", lazy_xds_annotations("true"));
        assert!(is_lazy_xds_enabled(&ns));
    }

    #[test]
    fn test_is_lazy_xds_enabled_rejects_inexact_values() {
        for value in ["True", "TRUE", "1", "yes", ""] {
            let ns = make_namespace("team-a", lazy_xds_annotations(value));
            assert!(!is_lazy_xds_enabled(&ns), "value {:?} must not opt in", value);
        }
    }

    #[test]
    fn test_is_lazy_xds_enabled_no_annotations() {
        let ns = make_namespace("team-a", None);
        assert!(!is_lazy_xds_enabled(&ns));
    }

    #[test]
    fn test_is_lazy_xds_enabled_unrelated_annotation() {
        let ns = make_namespace(
            "team-a",
            Some(BTreeMap::from([(
                "some.other/annotation".to_string(),
                "true".to_string(),
            )])),
        );
        assert!(!is_lazy_xds_enabled(&ns));
    }

    #[tokio::test]
    async fn test_reconcile_provisions_opted_in_namespace() {
        let mock = MockService::new()
            .on_get(
                &format!("{}/team-a", NAMESPACES_PATH),
                200,
                &namespace_json("team-a", &[("lazy-xds", "true")]),
            )
            .on_post(SIDECARS_PATH, 201, &sidecar_json("team-a"));
        let ctx = make_context(&mock);

        let ns = make_namespace("team-a", lazy_xds_annotations("true"));
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("POST", SIDECARS_PATH), 1);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let mock = MockService::new()
            .on_get(
                &format!("{}/team-a", NAMESPACES_PATH),
                200,
                &namespace_json("team-a", &[("lazy-xds", "true")]),
            )
            .on_get(
                &format!("{}/lazyxds-default", SIDECARS_PATH),
                200,
                &sidecar_json("team-a"),
            );
        let ctx = make_context(&mock);

        let ns = make_namespace("team-a", lazy_xds_annotations("true"));
        reconcile(Arc::new(ns.clone()), ctx.clone()).await.unwrap();
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("POST", SIDECARS_PATH), 0);
    }

    #[tokio::test]
    async fn test_reconcile_skips_namespace_without_annotation() {
        let mock = MockService::new().on_get(
            &format!("{}/team-b", NAMESPACES_PATH),
            200,
            &namespace_json("team-b", &[]),
        );
        let ctx = make_context(&mock);

        let ns = make_namespace("team-b", None);
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("GET", "/apis/networking.istio.io"), 0);
        assert_eq!(mock.calls("POST", "/apis/networking.istio.io"), 0);
    }

    #[tokio::test]
    async fn test_reconcile_vanished_namespace_is_success() {
        // No responses registered: the namespace GET answers 404
        let mock = MockService::new();
        let ctx = make_context(&mock);

        let ns = make_namespace("team-c", lazy_xds_annotations("true"));
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("POST", "/apis/networking.istio.io"), 0);
    }

    #[tokio::test]
    async fn test_reconcile_propagates_transient_fetch_error() {
        let mock = MockService::new().on_get(
            &format!("{}/team-a", NAMESPACES_PATH),
            500,
            &internal_error_json(),
        );
        let ctx = make_context(&mock);

        let ns = make_namespace("team-a", lazy_xds_annotations("true"));
        let result = reconcile(Arc::new(ns), ctx).await;

        assert!(matches!(result, Err(LazyXdsError::KubeError(_))));
    }

    #[tokio::test]
    async fn test_reconcile_ignores_stale_event_payload() {
        // The event object claims the namespace opted in, but live state says
        // otherwise; the live read wins and no sidecar is created.
        let mock = MockService::new().on_get(
            &format!("{}/team-a", NAMESPACES_PATH),
            200,
            &namespace_json("team-a", &[]),
        );
        let ctx = make_context(&mock);

        let ns = make_namespace("team-a", lazy_xds_annotations("true"));
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("POST", SIDECARS_PATH), 0);
    }

    #[tokio::test]
    async fn test_reconcile_trusts_live_state_over_bare_payload() {
        // Conversely, a bare event payload must not mask an opt-in that is
        // visible in live state.
        let mock = MockService::new()
            .on_get(
                &format!("{}/team-a", NAMESPACES_PATH),
                200,
                &namespace_json("team-a", &[("lazy-xds", "true")]),
            )
            .on_post(SIDECARS_PATH, 201, &sidecar_json("team-a"));
        let ctx = make_context(&mock);

        let ns = make_namespace("team-a", None);
        reconcile(Arc::new(ns), ctx).await.unwrap();

        assert_eq!(mock.calls("POST", SIDECARS_PATH), 1);
    }
}
