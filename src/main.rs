use std::future::ready;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::{Api, Client};
use kube::runtime::controller::Controller;
use kube::runtime::watcher;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use synthetic_hpa_controller::core::config::{compose_config, ControllerConfig};
use synthetic_hpa_controller::model::context::{ContextData, KubeContextData};
use synthetic_hpa_controller::policy::error::error_policy;
use synthetic_hpa_controller::policy::gate;
use synthetic_hpa_controller::policy::reconciliation::reconcile;
use synthetic_hpa_controller::service::store_svc::{KubeStore, ObjectStore};

type StatefulSets = KubeStore<StatefulSet>;
type Autoscalers = KubeStore<HorizontalPodAutoscaler>;

fn setup_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Error installing metrics recorder")
}

async fn log_managed_autoscalers(autoscalers: &Autoscalers) {
    match autoscalers.list(&gate::managed_autoscalers_selector()).await {
        Ok(found) => log::info!("Found {} autoscalers managed by {}", found.len(), gate::MANAGER_NAME),
        Err(err) => log::warn!("Cannot list managed autoscalers - {err}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let app_config: ControllerConfig =
        compose_config("synthetic-hpa-controller", "SYNTHETIC_HPA").context("Error loading configuration")?;

    let recorder_handle = setup_metrics_recorder()?;
    let kubernetes_client = Client::try_default().await
        .context("Error building kubernetes client")?;

    let context: Arc<KubeContextData> = Arc::new(ContextData {
        statefulsets: KubeStore::scoped(kubernetes_client.clone(), app_config.namespace.clone()),
        autoscalers: KubeStore::scoped(kubernetes_client.clone(), app_config.namespace.clone()),
        error_requeue: app_config.error_requeue(),
        resync: app_config.resync(),
    });

    log_managed_autoscalers(&context.autoscalers).await;

    let (statefulsets_api, autoscalers_api): (Api<StatefulSet>, Api<HorizontalPodAutoscaler>) = match &app_config.namespace {
        Some(namespace) => (
            Api::namespaced(kubernetes_client.clone(), namespace),
            Api::namespaced(kubernetes_client.clone(), namespace),
        ),
        None => (Api::all(kubernetes_client.clone()), Api::all(kubernetes_client.clone())),
    };

    // Autoscalers carry a controller owner reference, so changes to them map back to their StatefulSet.
    let controller = Controller::new(statefulsets_api, gate::watcher_config())
        .owns(autoscalers_api, watcher::Config::default())
        .shutdown_on_signal()
        .run(
            reconcile::<StatefulSets, Autoscalers>,
            error_policy::<StatefulSets, Autoscalers>,
            context,
        )
        .for_each(|reconciliation_result| async move {
            match reconciliation_result {
                Ok((statefulset, _action)) => log::debug!("Reconciliation successful. StatefulSet: {statefulset}"),
                Err(reconciliation_err) => log::warn!("Reconciliation error: {reconciliation_err}"),
            }
        });

    let app = Router::new()
        .route("/metrics", get(move || ready(recorder_handle.render())))
        .route("/healthz", get(|| ready("ok")));

    let metrics_server = axum::Server::bind(&app_config.metrics_address)
        .serve(app.into_make_service());

    log::info!("Serving metrics on {}", app_config.metrics_address);
    tokio::select! {
        _ = controller => log::info!("Controller terminated"),
        res = metrics_server => res.context("Metrics server failed")?,
    }

    Ok(())
}
