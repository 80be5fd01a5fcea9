use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use kube::core::ErrorResponse;
use kube::Resource;

use crate::model::error::{StoreAction, StoreError};
use crate::model::key::ObjectKey;
use crate::service::store_svc::{link_owner, ObjectStore};

/// In-memory store recording every write, used to drive reconciliations in tests.
pub struct MemoryStore<K> {
    objects: Mutex<BTreeMap<ObjectKey, K>>,
    writes: Mutex<Vec<StoreAction>>,
    failing: Mutex<Option<StoreAction>>,
    last_update_revision: Mutex<Option<String>>,
    revision: Mutex<u64>,
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(Vec::new()),
            failing: Mutex::new(None),
            last_update_revision: Mutex::new(None),
            revision: Mutex::new(0),
        }
    }
}

impl<K: Resource + Clone> MemoryStore<K> {
    /// Seeds an object without recording a write.
    pub fn insert(&self, mut object: K) {
        object.meta_mut().resource_version = Some(self.next_revision());
        let key = key_of(&object);
        self.objects.lock().unwrap().insert(key, object);
    }

    /// Deletes an object behind the controller's back.
    pub fn remove(&self, key: &ObjectKey) -> Option<K> {
        self.objects.lock().unwrap().remove(key)
    }

    pub fn stored(&self, key: &ObjectKey) -> Option<K> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> Vec<StoreAction> {
        self.writes.lock().unwrap().clone()
    }

    /// Resource version the last update was based on.
    pub fn last_update_revision(&self) -> Option<String> {
        self.last_update_revision.lock().unwrap().clone()
    }

    /// Makes every following call of `action` fail with a server error.
    pub fn fail_on(&self, action: StoreAction) {
        *self.failing.lock().unwrap() = Some(action);
    }

    fn check(&self, action: StoreAction) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap() == Some(action) {
            return Err(StoreError::Api(kube::Error::Api(ErrorResponse {
                status: String::from("Failure"),
                message: format!("{action} rejected"),
                reason: String::from("InternalError"),
                code: 500,
            })));
        }
        Ok(())
    }

    fn next_revision(&self) -> String {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        revision.to_string()
    }
}

fn key_of<K: Resource>(object: &K) -> ObjectKey {
    let meta = object.meta();
    ObjectKey::new(
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

fn matches_selector(selector: &str, labels: Option<&BTreeMap<String, String>>) -> bool {
    selector.split(',')
        .filter(|requirement| !requirement.is_empty())
        .all(|requirement| match requirement.split_once('=') {
            Some((key, value)) => labels.and_then(|labels| labels.get(key)).map(|v| v.eq(value)).unwrap_or(false),
            None => false,
        })
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore<K>
    where K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError> {
        self.check(StoreAction::Get)?;
        self.stored(key).ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<K>, StoreError> {
        self.check(StoreAction::List)?;
        Ok(self.objects.lock().unwrap()
            .values()
            .filter(|object| matches_selector(label_selector, object.meta().labels.as_ref()))
            .cloned()
            .collect())
    }

    async fn create<O>(&self, owner: &O, mut object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync,
    {
        self.check(StoreAction::Create)?;
        link_owner(owner, &mut object)?;
        object.meta_mut().resource_version = Some(self.next_revision());
        self.objects.lock().unwrap().insert(key_of(&object), object);
        self.writes.lock().unwrap().push(StoreAction::Create);
        Ok(())
    }

    async fn update<O>(&self, owner: &O, mut object: K) -> Result<(), StoreError>
        where O: Resource<DynamicType=()> + Sync,
    {
        self.check(StoreAction::Update)?;
        link_owner(owner, &mut object)?;
        *self.last_update_revision.lock().unwrap() = object.meta().resource_version.clone();
        object.meta_mut().resource_version = Some(self.next_revision());
        self.objects.lock().unwrap().insert(key_of(&object), object);
        self.writes.lock().unwrap().push(StoreAction::Update);
        Ok(())
    }
}
