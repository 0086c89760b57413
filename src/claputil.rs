use std::ffi::OsStr;

use clap_complete::engine::{ArgValueCompleter, CompletionCandidate};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, config::Kubeconfig};
use tokio::{runtime::Handle, task};

/// Create an `ArgValueCompleter` that lists contexts from the active kubeconfig.
///
/// The current context is offered first.
pub fn context_value_completer() -> ArgValueCompleter {
    ArgValueCompleter::new(|input: &OsStr| -> Vec<CompletionCandidate> {
        let Ok(kubeconfig) = Kubeconfig::read() else {
            return Vec::new();
        };

        let input = input.to_string_lossy();
        let input = input.trim();

        let mut names: Vec<&str> = kubeconfig
            .contexts
            .iter()
            .map(|named_context| named_context.name.as_str())
            .filter(|name| name.starts_with(input))
            .collect();
        if let Some(current) = kubeconfig.current_context.as_deref() {
            names.sort_by_key(|name| *name != current);
        }

        names.into_iter().map(CompletionCandidate::new).collect()
    })
}

/// Create an `ArgValueCompleter` that lists namespaces of the current context.
///
/// This makes a network call to the cluster, so it may be slow, and it returns no
/// candidates on network, authentication or permission failures.
///
/// Limitation: the context given by --context is not considered.
/// See https://github.com/clap-rs/clap/issues/1910 for more details.
pub fn namespace_value_completer() -> ArgValueCompleter {
    ArgValueCompleter::new(|input: &OsStr| -> Vec<CompletionCandidate> {
        let Ok(kubeconfig) = Kubeconfig::read() else {
            return Vec::new();
        };
        let Ok(context) = crate::determine_context(None, &kubeconfig) else {
            return Vec::new();
        };

        let input = input.to_string_lossy().trim().to_string();

        let namespaces_future = async move {
            let Ok(config) = crate::client_config(kubeconfig, &context, None).await else {
                return Vec::new();
            };
            let Ok(client) = Client::try_from(config) else {
                return Vec::new();
            };

            let namespaces: Api<Namespace> = Api::all(client);
            let Ok(list) = namespaces.list(&Default::default()).await else {
                return Vec::new();
            };

            list.items
                .iter()
                .filter_map(|ns| ns.metadata.name.as_deref())
                .filter(|name| name.starts_with(&input))
                .map(CompletionCandidate::new)
                .collect()
        };

        // `Runtime::block_on` panics inside a runtime, so escape to a blocking
        // thread and reuse the current handle when one exists.
        match Handle::try_current() {
            Ok(handle) => task::block_in_place(move || handle.block_on(namespaces_future)),
            Err(_) => tokio::runtime::Runtime::new()
                .map(|rt| rt.block_on(namespaces_future))
                .unwrap_or_default(),
        }
    })
}
