//! `kube_service_info_extended` collector.

use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, Opts};

use crate::cache::{Mirror, ServiceEntity, Snapshot};

pub const METRIC_NAME: &str = "kube_service_info_extended";
pub const METRIC_HELP: &str = "Extended information for services";
pub const METRIC_LABELS: [&str; 4] = ["service", "namespace", "load_balancer_ip", "uid"];

/// One derived data point. The value is always [`Observation::VALUE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Observation {
    pub service: String,
    pub namespace: String,
    pub load_balancer_ip: String,
    pub uid: String,
}

impl Observation {
    /// Presence indicator, not a count.
    pub const VALUE: f64 = 1.0;

    /// Derive an observation, or `None` when the service does not qualify.
    ///
    /// Qualifies only if it is a `LoadBalancer` with at least one assigned
    /// ingress; the first ingress (as delivered) supplies the address.
    pub fn from_entity(entity: &ServiceEntity) -> Option<Self> {
        if !entity.service_type.is_load_balancer() {
            return None;
        }
        // Still provisioning: no address yet, nothing to report.
        let ingress = entity.first_ingress()?;

        Some(Self {
            service: entity.name.clone(),
            namespace: entity.namespace.clone(),
            load_balancer_ip: ingress.ip.clone().unwrap_or_default(),
            uid: entity.uid.clone(),
        })
    }

    /// Label values in [`METRIC_LABELS`] order.
    pub fn label_values(&self) -> [&str; 4] {
        [&self.service, &self.namespace, &self.load_balancer_ip, &self.uid]
    }
}

/// Lazily derive every observation from one snapshot.
pub fn observations(snapshot: &Snapshot) -> impl Iterator<Item = Observation> + '_ {
    snapshot.iter().filter_map(Observation::from_entity)
}

/// Prometheus collector reading the mirror on each scrape.
pub struct ServiceCollector {
    mirror: Arc<Mirror>,
    opts: Opts,
    descs: Vec<Desc>,
}

impl ServiceCollector {
    pub fn new(mirror: Arc<Mirror>) -> prometheus::Result<Self> {
        let opts = Opts::new(METRIC_NAME, METRIC_HELP);
        let descs = CounterVec::new(opts.clone(), &METRIC_LABELS)?
            .desc()
            .into_iter()
            .cloned()
            .collect();

        Ok(Self { mirror, opts, descs })
    }

    /// Observations for the mirror as it is right now.
    pub fn observations(&self) -> Vec<Observation> {
        observations(&self.mirror.snapshot()).collect()
    }
}

impl Collector for ServiceCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        // A fresh vec per scrape: series for deleted services must not linger.
        let family = match CounterVec::new(self.opts.clone(), &METRIC_LABELS) {
            Ok(family) => family,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build service metric family");
                return Vec::new();
            }
        };

        let snapshot = self.mirror.snapshot();
        for observation in observations(&snapshot) {
            family
                .with_label_values(&observation.label_values())
                .inc_by(Observation::VALUE);
        }

        family.collect()
    }
}
