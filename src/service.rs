use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Service;

/// Label selector matching the add-on services shown by `cluster-info`.
pub const CLUSTER_SERVICE_SELECTOR: &str = "kubernetes.io/cluster-service=true";

/// Label key holding the human-facing name of a cluster service.
pub const NAME_LABEL: &str = "kubernetes.io/name";

/// API server path prefix used to reach services without a public address.
const PROXY_PATH: &str = "/api/v1beta3/proxy/namespaces";

/// A discovered service, reduced to what is needed to print its endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// Externally reachable addresses, in the order the API reports them.
    pub public_addresses: Vec<String>,
    pub ports: Vec<i32>,
}

impl ServiceDescriptor {
    /// Build a descriptor from a `Service` returned by the API server.
    ///
    /// Returns `None` when the service has no name, as there is no way to
    /// build a proxy URL for it.
    ///
    /// Public addresses come from `spec.externalIPs` first, followed by the
    /// load balancer ingress points (`ip`, or `hostname` when no ip is set).
    pub fn from_service(service: &Service) -> Option<Self> {
        let name = service
            .metadata
            .name
            .as_deref()
            .filter(|name| !name.is_empty())?
            .to_string();

        let spec = service.spec.as_ref();

        let mut public_addresses: Vec<String> = spec
            .and_then(|spec| spec.external_ips.clone())
            .unwrap_or_default();
        public_addresses.extend(
            service
                .status
                .as_ref()
                .and_then(|status| status.load_balancer.as_ref())
                .and_then(|lb| lb.ingress.as_ref())
                .into_iter()
                .flatten()
                .filter_map(|ingress| ingress.ip.clone().or_else(|| ingress.hostname.clone())),
        );

        let ports = spec
            .and_then(|spec| spec.ports.as_ref())
            .map(|ports| ports.iter().map(|port| port.port).collect())
            .unwrap_or_default();

        Some(Self {
            name,
            namespace: service.metadata.namespace.clone().unwrap_or_default(),
            labels: service.metadata.labels.clone().unwrap_or_default(),
            public_addresses,
            ports,
        })
    }

    /// The value of the [`NAME_LABEL`] label, or an empty string.
    pub fn display_name(&self) -> &str {
        self.labels.get(NAME_LABEL).map(String::as_str).unwrap_or("")
    }
}

/// A label and the address it is reachable at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointLine {
    pub label: String,
    pub url: String,
}

impl EndpointLine {
    /// The display name and derived URL of `service`.
    pub fn for_service(service: &ServiceDescriptor, cluster_host: &str) -> Self {
        Self {
            label: service.display_name().to_string(),
            url: derive_service_url(service, cluster_host),
        }
    }
}

/// Derive the URL(s) a service can be reached at.
///
/// A service with public addresses yields one `http://<address>:<port> ` entry
/// per port, all on the first address only, each followed by a space. With no
/// ports the result is empty. Otherwise the service is reached through the API
/// server proxy of `cluster_host`.
pub fn derive_service_url(service: &ServiceDescriptor, cluster_host: &str) -> String {
    match service.public_addresses.first() {
        Some(address) => service
            .ports
            .iter()
            .map(|port| format!("http://{address}:{port} "))
            .collect(),
        None => format!(
            "{cluster_host}{PROXY_PATH}/{}/services/{}",
            service.namespace, service.name
        ),
    }
}

/// Convert listed services into descriptors, dropping those without a name.
pub fn descriptors_from_services<'a>(
    services: impl IntoIterator<Item = &'a Service>,
) -> Vec<ServiceDescriptor> {
    services
        .into_iter()
        .filter_map(|service| {
            let descriptor = ServiceDescriptor::from_service(service);
            if descriptor.is_none() {
                tracing::debug!("skipping service without a name");
            }
            descriptor
        })
        .collect()
}
