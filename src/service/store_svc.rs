use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{ListParams, PostParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::error::StoreError;
use crate::model::key::ObjectKey;

/// Typed get/list/create/update over one resource kind.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
    where K: Resource + Send + Sync + 'static,
{
    /// Fails with [`StoreError::NotFound`] when nothing is stored under `key`.
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError>;

    async fn list(&self, label_selector: &str) -> Result<Vec<K>, StoreError>;

    async fn create<O>(&self, owner: &O, object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync;

    /// Replaces the stored object wholesale.
    async fn update<O>(&self, owner: &O, object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync;
}

/// Points `object` at `owner` through a controller owner reference so the
/// garbage collector removes it together with its owner.
pub fn link_owner<O, K>(owner: &O, object: &mut K) -> Result<(), StoreError>
    where O: Resource<DynamicType=()>,
          K: Resource,
{
    let oref = owner.controller_owner_ref(&())
        .ok_or_else(|| StoreError::MissingOwnerReference(object_key(object)))?;
    object.meta_mut().owner_references = Some(vec![oref]);
    Ok(())
}

fn object_key<K: Resource>(object: &K) -> ObjectKey {
    let meta = object.meta();
    ObjectKey::new(
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

pub struct KubeStore<K> {
    client: Client,
    /// Namespace `list` is restricted to, all namespaces when unset.
    list_namespace: Option<String>,
    kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            list_namespace: None,
            kind: PhantomData,
        }
    }

    pub fn scoped(client: Client, namespace: Option<String>) -> Self {
        Self {
            list_namespace: namespace,
            ..Self::new(client)
        }
    }

    pub fn list_namespace(&self) -> Option<&str> {
        self.list_namespace.as_deref()
    }
}

impl<K> KubeStore<K>
    where K: Resource<Scope=NamespaceResourceScope>,
          K::DynamicType: Default,
{
    fn namespaced(&self, namespace: &str) -> Api<K> { Api::namespaced(self.client.clone(), namespace) }
    fn all(&self) -> Api<K> { Api::all(self.client.clone()) }

    fn listable(&self) -> Api<K> {
        match self.list_namespace() {
            Some(namespace) => self.namespaced(namespace),
            None => self.all(),
        }
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore<K>
    where K: Resource<Scope=NamespaceResourceScope, DynamicType=()>
            + Clone + Debug + DeserializeOwned + Serialize + Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError> {
        match self.namespaced(&key.namespace).get(&key.name).await {
            Ok(object) => Ok(object),
            Err(kube::Error::Api(response)) if response.code == 404 => Err(StoreError::NotFound(key.clone())),
            Err(err) => Err(StoreError::Api(err)),
        }
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<K>, StoreError> {
        let params = ListParams::default().labels(label_selector);
        let objects = self.listable()
            .list(&params)
            .await
            .map_err(StoreError::Api)?;
        Ok(objects.items)
    }

    async fn create<O>(&self, owner: &O, mut object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync,
    {
        link_owner(owner, &mut object)?;
        let key = object_key(&object);
        self.namespaced(&key.namespace)
            .create(&PostParams::default(), &object)
            .await
            .map_err(StoreError::Api)?;
        Ok(())
    }

    async fn update<O>(&self, owner: &O, mut object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync,
    {
        link_owner(owner, &mut object)?;
        let key = object_key(&object);
        self.namespaced(&key.namespace)
            .replace(&key.name, &PostParams::default(), &object)
            .await
            .map_err(StoreError::Api)?;
        Ok(())
    }
}
