use std::sync::Arc;

use k8s_openapi::api::apps::v1::StatefulSet;
use kube::runtime::controller::Action;
use kube::ResourceExt;

use crate::model::context::ContextData;
use crate::model::error::Error;

/// an error handler that will be called when the reconciler fails with access to both the
/// object that caused the failure and the actual error
pub fn error_policy<P, C>(statefulset: Arc<StatefulSet>, error: &Error, ctx: Arc<ContextData<P, C>>) -> Action {
    log::warn!(
        "Reconciliation of StatefulSet {}/{} failed, retrying in {}s - {error}",
        statefulset.namespace().unwrap_or_default(),
        statefulset.name_any(),
        ctx.error_requeue.as_secs(),
    );
    Action::requeue(ctx.error_requeue)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn failed_reconciliation_is_requeued_after_configured_delay() {
        let ctx = Arc::new(ContextData {
            statefulsets: (),
            autoscalers: (),
            error_requeue: Duration::from_secs(15),
            resync: Duration::from_secs(300),
        });
        let error = Error::MissingObjectKey(".metadata.name");

        let action = error_policy(Arc::new(StatefulSet::default()), &error, ctx);

        assert_eq!(action, Action::requeue(Duration::from_secs(15)));
    }
}
