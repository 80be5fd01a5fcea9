use std::collections::BTreeMap;

use kube::runtime::watcher::Config;

/// Labels a StatefulSet must carry to get an autoscaler.
pub static STATEFULSET_SELECTOR: [(&str, &str); 4] = [
    ("app.kubernetes.io/component", "synthetic"),
    ("app.kubernetes.io/created-by", "dynakube"),
    ("app.kubernetes.io/managed-by", "dynatrace-operator"),
    ("app.kubernetes.io/name", "activegate"),
];

pub static LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub static MANAGER_NAME: &str = "synthetic-controller";

pub fn selector_string(selector: &[(&str, &str)]) -> String {
    selector.iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Watch configuration filtering StatefulSet events server-side.
pub fn watcher_config() -> Config {
    Config::default().labels(&selector_string(&STATEFULSET_SELECTOR))
}

/// Selector matching every autoscaler written by this controller.
pub fn managed_autoscalers_selector() -> String {
    selector_string(&[(LABEL_MANAGED_BY, MANAGER_NAME)])
}

pub fn admits(labels: &BTreeMap<String, String>) -> bool {
    STATEFULSET_SELECTOR.iter()
        .all(|(key, value)| labels.get(*key).map(|v| v.eq(value)).unwrap_or(false))
}
