//! Mirrored service entity.
//!
//! # Responsibilities
//! - Hold the subset of a `Service` object the exporter reads
//! - Convert from the Kubernetes API type without ever failing
//!
//! # Design Decisions
//! - Identity is the object uid; name + namespace are labels only
//! - Missing optional fields collapse to empty values
//! - Ingress order is kept exactly as delivered by the API server

use k8s_openapi::api::core::v1::{LoadBalancerIngress, Service};

/// Exposure type of a service (`spec.type`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
    /// Any value this exporter does not know about.
    Other(String),
}

impl ServiceType {
    /// Parse the `spec.type` field. An absent type is `ClusterIP`, the API default.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("ClusterIP") => ServiceType::ClusterIP,
            Some("NodePort") => ServiceType::NodePort,
            Some("LoadBalancer") => ServiceType::LoadBalancer,
            Some("ExternalName") => ServiceType::ExternalName,
            Some(other) => ServiceType::Other(other.to_string()),
        }
    }

    pub fn is_load_balancer(&self) -> bool {
        matches!(self, ServiceType::LoadBalancer)
    }
}

/// One assigned load-balancer endpoint (`status.loadBalancer.ingress[]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressPoint {
    pub ip: Option<String>,
    pub hostname: Option<String>,
}

impl IngressPoint {
    /// Endpoint with an IP address.
    pub fn ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            hostname: None,
        }
    }

    /// Endpoint with only a DNS name (typical for some cloud load balancers).
    pub fn hostname(hostname: impl Into<String>) -> Self {
        Self {
            ip: None,
            hostname: Some(hostname.into()),
        }
    }
}

impl From<&LoadBalancerIngress> for IngressPoint {
    fn from(ingress: &LoadBalancerIngress) -> Self {
        Self {
            ip: ingress.ip.clone(),
            hostname: ingress.hostname.clone(),
        }
    }
}

/// Latest known state of one remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntity {
    /// Stable unique identifier (`metadata.uid`).
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub service_type: ServiceType,
    /// Assigned endpoints, in API delivery order.
    pub ingress: Vec<IngressPoint>,
}

impl ServiceEntity {
    /// Build an entity from its parts.
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        service_type: ServiceType,
        ingress: Vec<IngressPoint>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            namespace: namespace.into(),
            service_type,
            ingress,
        }
    }

    /// Convert a Kubernetes `Service`.
    ///
    /// Returns `None` only when the object carries no uid, since such an
    /// object cannot be tracked by identity.
    pub fn from_service(service: &Service) -> Option<Self> {
        let meta = &service.metadata;
        let uid = meta.uid.clone()?;

        let service_type = ServiceType::parse(
            service
                .spec
                .as_ref()
                .and_then(|spec| spec.type_.as_deref()),
        );

        let ingress = service
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|points| points.iter().map(IngressPoint::from).collect())
            .unwrap_or_default();

        Some(Self {
            uid,
            name: meta.name.clone().unwrap_or_default(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            service_type,
            ingress,
        })
    }

    /// First assigned endpoint, if provisioning has produced one.
    pub fn first_ingress(&self) -> Option<&IngressPoint> {
        self.ingress.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{LoadBalancerStatus, ServiceSpec, ServiceStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn service(uid: Option<&str>, type_: Option<&str>, ips: &[&str]) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some("web".into()),
                namespace: Some("prod".into()),
                uid: uid.map(String::from),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: type_.map(String::from),
                ..Default::default()
            }),
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(
                        ips.iter()
                            .map(|ip| LoadBalancerIngress {
                                ip: Some(ip.to_string()),
                                ..Default::default()
                            })
                            .collect(),
                    ),
                }),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_from_service_keeps_ingress_order() {
        let svc = service(Some("u1"), Some("LoadBalancer"), &["10.0.0.2", "10.0.0.1"]);
        let entity = ServiceEntity::from_service(&svc).unwrap();

        assert_eq!(entity.uid, "u1");
        assert_eq!(entity.name, "web");
        assert_eq!(entity.namespace, "prod");
        assert_eq!(entity.service_type, ServiceType::LoadBalancer);
        assert_eq!(
            entity.ingress,
            vec![IngressPoint::ip("10.0.0.2"), IngressPoint::ip("10.0.0.1")]
        );
        assert_eq!(entity.first_ingress(), Some(&IngressPoint::ip("10.0.0.2")));
    }

    #[test]
    fn test_from_service_without_uid_is_skipped() {
        let svc = service(None, Some("LoadBalancer"), &["10.0.0.1"]);
        assert!(ServiceEntity::from_service(&svc).is_none());
    }

    #[test]
    fn test_from_service_tolerates_missing_spec_and_status() {
        let svc = Service {
            metadata: ObjectMeta {
                uid: Some("u2".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let entity = ServiceEntity::from_service(&svc).unwrap();

        assert_eq!(entity.service_type, ServiceType::ClusterIP);
        assert!(entity.ingress.is_empty());
        assert!(entity.name.is_empty());
        assert!(entity.first_ingress().is_none());
    }

    #[test]
    fn test_service_type_parse() {
        assert_eq!(ServiceType::parse(Some("NodePort")), ServiceType::NodePort);
        assert_eq!(ServiceType::parse(Some("ExternalName")), ServiceType::ExternalName);
        assert_eq!(
            ServiceType::parse(Some("Headless")),
            ServiceType::Other("Headless".into())
        );
        assert!(ServiceType::parse(Some("LoadBalancer")).is_load_balancer());
        assert!(!ServiceType::parse(None).is_load_balancer());
    }
}
