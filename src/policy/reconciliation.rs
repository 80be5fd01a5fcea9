use std::sync::Arc;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::runtime::controller::Action;
use kube::ResourceExt;

use crate::model::context::ContextData;
use crate::model::error::{Error, StoreAction};
use crate::model::key::ObjectKey;
use crate::policy::gate;
use crate::service::reconciler_svc::{record_error, AutoscalerAction, AutoscalerReconciler};
use crate::service::store_svc::ObjectStore;

/// The reconciler that will be called whenever a selected StatefulSet or its autoscaler changes.
///
/// The event only carries the identity: the StatefulSet is read again so the
/// autoscaler is always derived from the latest stored spec. Successful runs are
/// requeued after the resync delay so autoscalers drifting without an event are healed too.
pub async fn reconcile<P, C>(statefulset: Arc<StatefulSet>, ctx: Arc<ContextData<P, C>>) -> Result<Action, Error>
    where P: ObjectStore<StatefulSet>,
          C: ObjectStore<HorizontalPodAutoscaler>,
{
    let key = ObjectKey::of(statefulset.as_ref())?;
    reconcile_key(&key, &ctx).await?;
    Ok(Action::requeue(ctx.resync))
}

/// Runs the autoscaler convergence for the StatefulSet stored under `key`.
///
/// Returns `None` when there is nothing to converge: the StatefulSet is gone or
/// it no longer carries the selected labels.
pub async fn reconcile_key<P, C>(key: &ObjectKey, ctx: &ContextData<P, C>) -> Result<Option<AutoscalerAction>, Error>
    where P: ObjectStore<StatefulSet>,
          C: ObjectStore<HorizontalPodAutoscaler>,
{
    let statefulset = match ctx.statefulsets.get(key).await {
        Ok(found) => found,
        Err(err) if err.is_not_found() => {
            log::debug!("StatefulSet {key} is gone, nothing to reconcile");
            return Ok(None);
        }
        Err(err) => {
            let err = Error::store(StoreAction::Get, "StatefulSet", key, err);
            record_error(&err);
            return Err(err);
        }
    };

    if !gate::admits(statefulset.labels()) {
        log::debug!("StatefulSet {key} is no longer selected, skipping");
        return Ok(None);
    }

    log::info!("Found StatefulSet {key} to reconcile");
    AutoscalerReconciler::new(&statefulset, &ctx.autoscalers)
        .reconcile()
        .await
        .map(Some)
}
