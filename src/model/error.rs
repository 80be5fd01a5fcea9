use std::fmt;

use thiserror::Error;

use crate::model::key::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Get,
    List,
    Create,
    Update,
}

impl StoreAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreAction::Get => "get",
            StoreAction::List => "list",
            StoreAction::Create => "create",
            StoreAction::Update => "update",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by an [`ObjectStore`](crate::service::store_svc::ObjectStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(ObjectKey),
    #[error("Cannot link {0} to its owner: owner has no name or uid")]
    MissingOwnerReference(ObjectKey),
    #[error("Api request failed: {0}")]
    Api(#[source] kube::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot fingerprint autoscaler {key}: {source}")]
    ConstructionFailure {
        key: ObjectKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cannot {action} {kind} {key}: {source}")]
    StoreFailure {
        action: StoreAction,
        kind: &'static str,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },
    #[error("MissingObjectKey: {0}")]
    MissingObjectKey(&'static str),
}

impl Error {
    pub fn store(action: StoreAction, kind: &'static str, key: &ObjectKey, source: StoreError) -> Self {
        Error::StoreFailure {
            action,
            kind,
            key: key.clone(),
            source,
        }
    }

    /// Store action that was being attempted, `build` for anything that failed before reaching the store.
    pub fn action_label(&self) -> &'static str {
        match self {
            Error::StoreFailure { action, .. } => action.as_str(),
            Error::ConstructionFailure { .. } | Error::MissingObjectKey(_) => "build",
        }
    }
}
