use std::time::Duration;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;

use crate::service::store_svc::KubeStore;

pub struct ContextData<P, C> {
    /// Store the parent StatefulSets are re-read from on every reconciliation.
    pub statefulsets: P,
    /// Store the derived autoscalers are read from and written to.
    pub autoscalers: C,
    /// Delay before a failed reconciliation is delivered again.
    pub error_requeue: Duration,
    /// Delay before a successfully reconciled StatefulSet is checked again.
    pub resync: Duration,
}

pub type KubeContextData = ContextData<KubeStore<StatefulSet>, KubeStore<HorizontalPodAutoscaler>>;
