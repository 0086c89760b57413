use anyhow::Context;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client, api::ListParams};

use crate::service::{CLUSTER_SERVICE_SELECTOR, ServiceDescriptor, descriptors_from_services};

/// List the cluster add-on services of `namespace`.
///
/// Services are returned in the order the API server lists them. Failures are
/// returned as is, without retrying.
pub async fn list_cluster_services(
    client: Client,
    namespace: &str,
) -> anyhow::Result<Vec<ServiceDescriptor>> {
    let services: Api<Service> = Api::namespaced(client, namespace);
    let params = ListParams::default().labels(CLUSTER_SERVICE_SELECTOR);

    let list = services.list(&params).await.with_context(|| {
        format!("Failed to list services matching {CLUSTER_SERVICE_SELECTOR} in namespace {namespace}")
    })?;
    tracing::debug!(count = list.items.len(), namespace, "listed cluster services");

    Ok(descriptors_from_services(&list.items))
}
