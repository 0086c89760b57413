use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Args, ColorChoice, CommandFactory, Parser, Subcommand};
use kube::Client;
use kubeinfo::{
    Palette, client_config, cluster_host, determine_context, determine_namespace,
    discover::list_cluster_services, load_kubeconfig,
};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Debug, Parser)]
#[command(name = "kubeinfo", version, about = "Inspect a Kubernetes cluster")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to the kubeconfig file to use
    #[arg(long, global = true, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Override the Kubernetes context to target
    #[arg(long, global = true, add = kubeinfo::context_value_completer())]
    context: Option<String>,

    /// Namespace to look for cluster services in
    #[arg(short, long, global = true, add = kubeinfo::namespace_value_completer())]
    namespace: Option<String>,

    /// Address of the Kubernetes API server, overriding the kubeconfig
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// When to color the output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Display cluster info
    #[command(
        long_about = "Display addresses of the master and services with label kubernetes.io/cluster-service=true"
    )]
    ClusterInfo,
    #[command(name = "clusterinfo", hide = true)]
    Clusterinfo,
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn deprecation_warning(command: &str, alias: &str) -> String {
    format!("{alias} is DEPRECATED and will be removed in a future version. Use {command} instead.")
}

async fn cluster_info(args: &GlobalArgs) -> anyhow::Result<()> {
    let kubeconfig = load_kubeconfig(args.kubeconfig.as_deref())?;
    let context = determine_context(args.context.as_deref(), &kubeconfig)?;
    let namespace = determine_namespace(args.namespace.clone(), &context, &kubeconfig);

    let config = client_config(kubeconfig, &context, args.server.as_deref()).await?;
    let host = cluster_host(&config);
    tracing::debug!(%context, %namespace, %host, "resolved cluster");

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    let services = list_cluster_services(client, &namespace).await?;

    let stdout = io::stdout();
    let no_color = std::env::var_os("NO_COLOR").is_some();
    let palette = Palette::from_choice(args.color, stdout.is_terminal(), no_color);
    kubeinfo::run(&mut stdout.lock(), &palette, &services, &host)
        .context("Failed to write cluster info")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kubeinfo::clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::ClusterInfo => cluster_info(&cli.global).await,
        Command::Clusterinfo => {
            eprintln!("{}", deprecation_warning("cluster-info", "clusterinfo"));
            cluster_info(&cli.global).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_info_subcommand_parses() {
        let cli = Cli::try_parse_from(["kubeinfo", "cluster-info", "-n", "kube-system"])
            .expect("cluster-info should parse");
        assert!(matches!(cli.command, Command::ClusterInfo));
        assert_eq!(cli.global.namespace.as_deref(), Some("kube-system"));
    }

    #[test]
    fn deprecated_alias_parses_but_is_hidden() {
        let cli =
            Cli::try_parse_from(["kubeinfo", "clusterinfo"]).expect("clusterinfo should parse");
        assert!(matches!(cli.command, Command::Clusterinfo));

        let help = Cli::command().render_help().to_string();
        assert!(help.contains("cluster-info"));
        assert!(!help.contains("clusterinfo"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "kubeinfo",
            "cluster-info",
            "--context",
            "system",
            "--color",
            "never",
        ])
        .expect("global flags should parse after the subcommand");
        assert_eq!(cli.global.context.as_deref(), Some("system"));
        assert_eq!(cli.global.color, ColorChoice::Never);
    }

    #[test]
    fn deprecation_warning_names_replacement() {
        assert_eq!(
            deprecation_warning("cluster-info", "clusterinfo"),
            "clusterinfo is DEPRECATED and will be removed in a future version. Use cluster-info instead."
        );
    }
}
