//! `ServiceSource` backed by the Kubernetes API.

use async_trait::async_trait;
use futures_util::{future, StreamExt};
use k8s_openapi::api::core::v1::Service;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::{Api, Client};

use crate::cache::{
    ChangeEvent, ChangeKind, ChangeStream, ServiceEntity, ServiceList, ServiceSource, SourceError,
};

/// Lists and watches `Service` objects across all namespaces.
#[derive(Clone)]
pub struct KubeServiceSource {
    api: Api<Service>,
    watch_timeout_secs: u32,
}

impl KubeServiceSource {
    pub fn new(client: Client, watch_timeout_secs: u32) -> Self {
        Self {
            api: Api::all(client),
            watch_timeout_secs,
        }
    }
}

#[async_trait]
impl ServiceSource for KubeServiceSource {
    async fn list(&self) -> Result<ServiceList, SourceError> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| SourceError::List(Box::new(e)))?;

        let resource_version = list.metadata.resource_version.clone().unwrap_or_default();
        let items = list
            .items
            .iter()
            .filter_map(|svc| to_entity(svc, "list"))
            .collect();

        Ok(ServiceList {
            items,
            resource_version,
        })
    }

    async fn watch(&self, resource_version: &str) -> Result<ChangeStream, SourceError> {
        let params = WatchParams::default().timeout(self.watch_timeout_secs);
        let stream = self
            .api
            .watch(&params, resource_version)
            .await
            .map_err(|e| match e {
                kube::Error::Api(response) if response.code == 410 => {
                    SourceError::Gone(response.message)
                }
                other => SourceError::Watch(Box::new(other)),
            })?;

        Ok(stream
            .filter_map(|event| future::ready(translate(event)))
            .boxed())
    }
}

/// Map one raw watch event onto the mirror's vocabulary.
fn translate(event: kube::Result<WatchEvent<Service>>) -> Option<Result<ChangeEvent, SourceError>> {
    let (kind, svc) = match event {
        Ok(WatchEvent::Added(svc)) => (ChangeKind::Added, svc),
        Ok(WatchEvent::Modified(svc)) => (ChangeKind::Modified, svc),
        Ok(WatchEvent::Deleted(svc)) => (ChangeKind::Deleted, svc),
        Ok(WatchEvent::Bookmark(_)) => return None,
        Ok(WatchEvent::Error(response)) if response.code == 410 => {
            return Some(Err(SourceError::Gone(response.message)));
        }
        Ok(WatchEvent::Error(response)) => {
            return Some(Err(SourceError::Watch(Box::new(kube::Error::Api(response)))));
        }
        Err(e) => return Some(Err(SourceError::Watch(Box::new(e)))),
    };

    to_entity(&svc, kind.as_str()).map(|entity| Ok(ChangeEvent::new(kind, entity)))
}

fn to_entity(svc: &Service, origin: &str) -> Option<ServiceEntity> {
    let entity = ServiceEntity::from_service(svc);
    if entity.is_none() {
        tracing::warn!(
            origin,
            name = ?svc.metadata.name,
            namespace = ?svc.metadata.namespace,
            "Skipping service without uid"
        );
    }
    entity
}
