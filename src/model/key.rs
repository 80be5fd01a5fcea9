use std::fmt;

use kube::{Resource, ResourceExt};

use crate::model::error::Error;

/// Namespace + name identity shared by a StatefulSet and the autoscaler derived from it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of<K: Resource>(resource: &K) -> Result<Self, Error> {
        let name = resource.meta().name.clone()
            .ok_or(Error::MissingObjectKey(".metadata.name"))?;

        Ok(Self {
            namespace: resource.namespace().unwrap_or_default(),
            name,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
