use kube::Resource;
use serde::Serialize;

/// Annotation holding the content hash of the spec the controller last wrote.
pub const FINGERPRINT_ANNOTATION: &str = "synthetic-controller.dynatrace.com/hash";

/// Hashes everything in `object` except its own fingerprint annotation.
pub fn fingerprint<K>(object: &K) -> Result<String, serde_json::Error>
    where K: Resource + Serialize + Clone,
{
    let mut snapshot = object.clone();
    let meta = snapshot.meta_mut();
    if let Some(annotations) = meta.annotations.as_mut() {
        annotations.remove(FINGERPRINT_ANNOTATION);
        if annotations.is_empty() {
            meta.annotations = None;
        }
    }

    let payload = serde_json::to_vec(&snapshot)?;
    Ok(format!("{:x}", md5::compute(payload)))
}

/// Computes the fingerprint of `object` and stores it in its annotations.
pub fn attach_fingerprint<K>(mut object: K) -> Result<K, serde_json::Error>
    where K: Resource + Serialize + Clone,
{
    let hash = fingerprint(&object)?;
    object.meta_mut()
        .annotations
        .get_or_insert_with(Default::default)
        .insert(String::from(FINGERPRINT_ANNOTATION), hash);
    Ok(object)
}

/// Fingerprint carried by `object`, empty when it was never stamped by this controller.
pub fn fingerprint_of<K: Resource>(object: &K) -> &str {
    object.meta()
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(FINGERPRINT_ANNOTATION))
        .map(String::as_str)
        .unwrap_or("")
}
