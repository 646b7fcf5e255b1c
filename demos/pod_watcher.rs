use tracing::*;

use kubesys::{
    api::{WatchEvent, WatchParams, Watcher},
    Api, Client, DocumentExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let client = Client::try_default()?;
    let namespace = std::env::var("NAMESPACE").unwrap_or_default();
    let api = Api::new(client);

    let wp = WatchParams::default().fields([("status.phase", "Running")]);
    let mut watcher = Watcher::new(api, "Pod", namespace).params(wp);
    let res = watcher
        .run(|event| {
            let pod = event.object();
            let name = pod.name().unwrap_or("<unnamed>");
            match &event {
                WatchEvent::Added(_) => info!("running pod {}/{}", pod.namespace(), name),
                WatchEvent::Modified(_) => debug!("changed pod {}/{}", pod.namespace(), name),
                WatchEvent::Deleted(_) => info!("gone pod {}/{}", pod.namespace(), name),
            }
        })
        .await;
    info!("watch ended in state {:?}", watcher.state());
    Ok(res?)
}
