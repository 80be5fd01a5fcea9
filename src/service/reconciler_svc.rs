use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;

use crate::model::error::{Error, StoreAction};
use crate::model::key::ObjectKey;
use crate::policy::autoscaler::build_autoscaler;
use crate::policy::fingerprint::fingerprint_of;
use crate::service::store_svc::ObjectStore;

pub static RECONCILIATIONS_METRIC_NAME: &str = "synthetic_hpa_reconciliations_total";
pub static RECONCILIATION_ERRORS_METRIC_NAME: &str = "synthetic_hpa_reconciliation_errors_total";

static AUTOSCALER_KIND: &str = "HorizontalPodAutoscaler";

/// Action taken on the autoscaler of a StatefulSet during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoscalerAction {
    /// No autoscaler exists yet for the StatefulSet
    Create,
    /// The stored autoscaler was built from a different spec, or not by this controller
    Update,
    /// The stored autoscaler already matches
    NoOp,
}

impl AutoscalerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoscalerAction::Create => "create",
            AutoscalerAction::Update => "update",
            AutoscalerAction::NoOp => "noop",
        }
    }
}

pub fn record_error(err: &Error) {
    metrics::counter!(RECONCILIATION_ERRORS_METRIC_NAME, "action" => err.action_label()).increment(1);
}

fn record_outcome(out: &Result<AutoscalerAction, Error>) {
    match out {
        Ok(action) => metrics::counter!(RECONCILIATIONS_METRIC_NAME, "action" => action.as_str()).increment(1),
        Err(err) => record_error(err),
    }
}

pub fn determine_action(desired: &HorizontalPodAutoscaler, observed: Option<&HorizontalPodAutoscaler>) -> AutoscalerAction {
    match observed {
        None => AutoscalerAction::Create,
        Some(found) if fingerprint_of(found).eq(fingerprint_of(desired)) => AutoscalerAction::NoOp,
        Some(_) => AutoscalerAction::Update,
    }
}

/// Converges the autoscaler of one StatefulSet. Holds nothing across invocations.
pub struct AutoscalerReconciler<'a, C> {
    statefulset: &'a StatefulSet,
    autoscalers: &'a C,
}

impl<'a, C> AutoscalerReconciler<'a, C>
    where C: ObjectStore<HorizontalPodAutoscaler>,
{
    pub fn new(statefulset: &'a StatefulSet, autoscalers: &'a C) -> Self {
        Self {
            statefulset,
            autoscalers,
        }
    }

    pub async fn reconcile(&self) -> Result<AutoscalerAction, Error> {
        let out = self.converge().await;
        record_outcome(&out);
        out
    }

    async fn converge(&self) -> Result<AutoscalerAction, Error> {
        let key = ObjectKey::of(self.statefulset)?;
        let desired = build_autoscaler(self.statefulset)
            .map_err(|source| Error::ConstructionFailure { key: key.clone(), source })?;

        let observed = self.find_autoscaler(&key).await?;
        let action = determine_action(&desired, observed.as_ref());

        match observed {
            Some(_) if action == AutoscalerAction::NoOp => log::debug!("Autoscaler {key} is up to date"),
            Some(found) => self.update(&key, desired, found).await?,
            None => self.create(&key, desired).await?,
        }

        Ok(action)
    }

    async fn find_autoscaler(&self, key: &ObjectKey) -> Result<Option<HorizontalPodAutoscaler>, Error> {
        match self.autoscalers.get(key).await {
            Ok(found) => Ok(Some(found)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(Error::store(StoreAction::Get, AUTOSCALER_KIND, key, err)),
        }
    }

    async fn create(&self, key: &ObjectKey, to_create: HorizontalPodAutoscaler) -> Result<(), Error> {
        let res = self.autoscalers.create(self.statefulset, to_create).await;
        if let Err(err) = res {
            log::error!("Could not create autoscaler {key} - {err}");
            return Err(Error::store(StoreAction::Create, AUTOSCALER_KIND, key, err));
        }

        log::info!("Created autoscaler {key}");
        Ok(())
    }

    async fn update(&self, key: &ObjectKey, mut to_update: HorizontalPodAutoscaler, found: HorizontalPodAutoscaler) -> Result<(), Error> {
        to_update.metadata.resource_version = found.metadata.resource_version;

        self.autoscalers.update(self.statefulset, to_update).await
            .map_err(|err| Error::store(StoreAction::Update, AUTOSCALER_KIND, key, err))?;

        log::info!("Updated autoscaler {key}");
        Ok(())
    }
}
