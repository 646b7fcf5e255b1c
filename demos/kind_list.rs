//! Print the kinds a cluster serves, similar to `kubectl api-resources`.
use clap::Parser;
use kubesys::{Api, Client, Config};

#[derive(Parser, Debug)]
#[command(version, about = "List the kinds served by the cluster")]
struct Args {
    /// Read this kubeconfig instead of inferring the environment
    #[arg(long)]
    kubeconfig: Option<std::path::PathBuf>,

    /// Server url for token authentication, requires --token
    #[arg(long, requires = "token")]
    server: Option<String>,

    /// Bearer token used together with --server
    #[arg(long, requires = "server")]
    token: Option<String>,

    /// Print the full registry as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match (&args.server, &args.token, &args.kubeconfig) {
        (Some(server), Some(token), _) => Config::insecure_with_token(server, token)?,
        (_, _, Some(path)) => Config::from_kubeconfig(path)?,
        _ => Config::infer()?,
    };
    let api = Api::new(Client::try_from(config)?);
    let registry = api.init().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registry.describe())?);
        return Ok(());
    }

    println!("{0:<48} {1:<28} {2:<11} VERBS", "FULLKIND", "APIVERSION", "NAMESPACED");
    for (full_kind, ar) in registry.iter() {
        println!(
            "{0:<48} {1:<28} {2:<11} {3}",
            full_kind,
            ar.api_version,
            ar.namespaced,
            ar.verbs.join(",")
        );
    }
    Ok(())
}
