use futures::{pin_mut, TryStreamExt};
use tracing::*;

use kubesys::{
    api::{WatchEvent, WatchParams},
    Api, Client, Discovery, DocumentExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let client = Client::try_default()?;

    // Take a short or group qualified kind, e.g. `Deployment` or `example.io.Widget`
    let kind = std::env::var("KIND").unwrap_or_else(|_| "Deployment".into());
    let namespace = std::env::var("NAMESPACE").unwrap_or_default();

    // Include custom resources whose groups the root listing has not caught up with yet
    let api = Api::from_discovery(Discovery::new(client).custom_resources(true));
    let full_kind = api.resolve(&kind).await?;
    info!("watching {}", full_kind);

    let stream = api.watch(&full_kind, &namespace, &WatchParams::default()).await?;
    pin_mut!(stream);
    while let Some(event) = stream.try_next().await? {
        match event {
            WatchEvent::Added(o) | WatchEvent::Modified(o) => info!("Applied: {}", o.name()?),
            WatchEvent::Deleted(o) => info!("Deleted: {}", o.name()?),
        }
    }
    Ok(())
}
