use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, ExternalMetricSource, HPAScalingPolicy, HPAScalingRules,
    HorizontalPodAutoscaler, HorizontalPodAutoscalerBehavior, HorizontalPodAutoscalerSpec,
    MetricIdentifier, MetricSpec, MetricTarget,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::ObjectMeta;
use kube::ResourceExt;

use crate::policy::fingerprint::attach_fingerprint;
use crate::policy::gate::{LABEL_MANAGED_BY, MANAGER_NAME};

pub static LOCATION_ENV: &str = "DT_LOCATION_ID";
pub static UNKNOWN_LOCATION: &str = "unknown";

pub const MIN_REPLICAS: i32 = 1;
pub const MAX_REPLICAS: i32 = 2;
pub static EXTERNAL_METRIC_TARGET_VALUE: &str = "80";
pub const SCALE_UP_STABILIZATION_WINDOW_SECONDS: i32 = 0;
pub const SCALE_DOWN_STABILIZATION_WINDOW_SECONDS: i32 = 300;
pub const SCALING_POLICY_PODS: i32 = 1;
pub const SCALING_POLICY_PERIOD_SECONDS: i32 = 600;

static SELECT_POLICY_MIN: &str = "Min";

/// Metric query for the average engine utilization of one synthetic location.
pub fn synthetic_utilization_query(location: &str) -> String {
    format!(r#"dsfm:synthetic.engine_utilization:filter(eq("dt.entity.synthetic_location","{location}")):merge("host.name","dt.active_gate.working_mode","dt.active_gate.id","location.name"):fold(avg)"#)
}

/// Location id from the env of the first container. Other containers are not inspected.
pub fn synthetic_location(statefulset: &StatefulSet) -> String {
    statefulset.spec.as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|pod_spec| pod_spec.containers.first())
        .and_then(|container| container.env.as_ref())
        .and_then(|env| env.iter().find(|var| var.name.eq(LOCATION_ENV)))
        .map(|var| var.value.clone().unwrap_or_default())
        .unwrap_or_else(|| String::from(UNKNOWN_LOCATION))
}

fn autoscaler_labels(name: &str) -> BTreeMap<String, String> {
    [
        (String::from("app.kubernetes.io/component"), String::from("synthetic")),
        (String::from("app.kubernetes.io/created-by"), String::from(name)),
        (String::from(LABEL_MANAGED_BY), String::from(MANAGER_NAME)),
        (String::from("app.kubernetes.io/name"), String::from(name)),
    ].into_iter().collect()
}

fn scaling_rules(stabilization_window_seconds: i32) -> HPAScalingRules {
    HPAScalingRules {
        stabilization_window_seconds: Some(stabilization_window_seconds),
        select_policy: Some(String::from(SELECT_POLICY_MIN)),
        policies: Some(vec![HPAScalingPolicy {
            type_: String::from("Pods"),
            value: SCALING_POLICY_PODS,
            period_seconds: SCALING_POLICY_PERIOD_SECONDS,
        }]),
    }
}

/// Builds the autoscaler `statefulset` should have, fingerprint annotation included.
///
/// Only fails when the autoscaler cannot be serialized for fingerprinting.
pub fn build_autoscaler(statefulset: &StatefulSet) -> Result<HorizontalPodAutoscaler, serde_json::Error> {
    let name = statefulset.name_any();
    let location = synthetic_location(statefulset);

    let autoscaler = HorizontalPodAutoscaler {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: statefulset.namespace(),
            labels: Some(autoscaler_labels(&name)),
            ..Default::default()
        },
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                kind: String::from(<StatefulSet as k8s_openapi::Resource>::KIND),
                name: name.clone(),
                api_version: Some(String::from(<StatefulSet as k8s_openapi::Resource>::API_VERSION)),
            },
            min_replicas: Some(MIN_REPLICAS),
            max_replicas: MAX_REPLICAS,
            metrics: Some(vec![MetricSpec {
                type_: String::from("External"),
                external: Some(ExternalMetricSource {
                    metric: MetricIdentifier {
                        name: synthetic_utilization_query(&location),
                        selector: None,
                    },
                    target: MetricTarget {
                        type_: String::from("Value"),
                        value: Some(Quantity(String::from(EXTERNAL_METRIC_TARGET_VALUE))),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            behavior: Some(HorizontalPodAutoscalerBehavior {
                scale_up: Some(scaling_rules(SCALE_UP_STABILIZATION_WINDOW_SECONDS)),
                scale_down: Some(scaling_rules(SCALE_DOWN_STABILIZATION_WINDOW_SECONDS)),
            }),
        }),
        status: None,
    };

    attach_fingerprint(autoscaler)
}
