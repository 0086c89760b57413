#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::path::Path;

use anyhow::Context;
pub use clap_complete;
pub use k8s_openapi;
pub use kube;

pub mod claputil;
pub use claputil::{context_value_completer, namespace_value_completer};
pub mod discover;
pub mod render;
pub use render::{Palette, render_cluster_header, render_service_line, run};
pub mod service;
pub use service::{EndpointLine, ServiceDescriptor, derive_service_url};

use kube::{
    Config,
    config::{KubeConfigOptions, Kubeconfig},
};

/// Reads the kubeconfig from `path`, or from the default locations
/// (`KUBECONFIG`, then `~/.kube/config`) when no path is given.
pub fn load_kubeconfig(path: Option<&Path>) -> anyhow::Result<Kubeconfig> {
    match path {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("Failed to read kubeconfig at {path:?}")),
        None => Kubeconfig::read().context("Failed to read kubeconfig"),
    }
}

/// Detects the Kubernetes context based on the provided `context` argument.
///
/// Context determination follows this priority:
/// 1. Uses the context if explicitly specified.
/// 2. Retrieves the current context from the kubeconfig.
///
/// # Errors
/// Returns an error if no context is given and no current context is set in the kubeconfig.
pub fn determine_context(context: Option<&str>, kubeconfig: &Kubeconfig) -> anyhow::Result<String> {
    match context {
        Some(context) => Ok(context.to_string()),
        None => kubeconfig
            .current_context
            .clone()
            .ok_or_else(|| anyhow::anyhow!("current_context is not set")),
    }
}

/// Determines the Kubernetes namespace based on the provided `namespace` and `context`.
///
/// Namespace determination follows this priority:
/// 1. Uses the namespace if explicitly specified.
/// 2. Uses the default namespace associated with `context` in the kubeconfig.
/// 3. Uses "default".
pub fn determine_namespace(
    namespace: Option<String>,
    context: &str,
    kubeconfig: &Kubeconfig,
) -> String {
    if let Some(ns) = namespace {
        return ns;
    }

    kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context)
        .and_then(|c| c.context.as_ref().and_then(|ctx| ctx.namespace.clone()))
        .unwrap_or_else(|| String::from("default"))
}

/// Builds the client configuration for `context`.
///
/// When `server` is given it replaces the cluster URL from the kubeconfig.
pub async fn client_config(
    kubeconfig: Kubeconfig,
    context: &str,
    server: Option<&str>,
) -> anyhow::Result<Config> {
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .with_context(|| format!("Failed to load configuration for context {context}"))?;

    if let Some(server) = server {
        config.cluster_url = server
            .parse()
            .with_context(|| format!("Invalid server address {server}"))?;
    }
    Ok(config)
}

/// The address of the API server, without a trailing slash.
pub fn cluster_host(config: &Config) -> String {
    config
        .cluster_url
        .to_string()
        .trim_end_matches('/')
        .to_string()
}
