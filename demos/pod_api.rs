use futures::{pin_mut, TryStreamExt};
use serde_json::json;
use tracing::*;

use kubesys::{
    api::{WatchEvent, WatchParams},
    Api, Client, DocumentExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let client = Client::try_default()?;
    let namespace = std::env::var("NAMESPACE").unwrap_or("default".into());
    let api = Api::new(client);

    let pods = api.list("Pod", &namespace).await?;
    for p in pods["items"].as_array().into_iter().flatten() {
        info!("found pod {}", p.name()?);
    }

    // Create Pod blog
    info!("Creating Pod instance blog");
    let p = json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": "blog", "namespace": namespace },
        "spec": {
            "containers": [{
              "name": "blog",
              "image": "clux/blog:0.1.0"
            }],
        }
    });
    match api.create(&p).await {
        Ok(o) => info!("Created {}", o.name()?),
        Err(kubesys::Error::Api(ae)) => assert_eq!(ae.code, 409), // if you skipped delete, for instance
        Err(e) => return Err(e.into()),                           // any other case is probably bad
    }

    // Watch its phase for a few seconds
    let wp = WatchParams::default().timeout(10);
    let stream = api.watch_named("Pod", &namespace, "blog", &wp).await?;
    pin_mut!(stream);
    while let Some(event) = stream.try_next().await? {
        match event {
            WatchEvent::Added(o) => info!("Added {}", o.name()?),
            WatchEvent::Modified(o) => {
                let phase = o.str_field("status.phase").unwrap_or_default();
                info!("Modified: {} with phase: {}", o.name()?, phase);
            }
            WatchEvent::Deleted(o) => info!("Deleted {}", o.name()?),
        }
    }

    // Verify we can get it
    info!("Get Pod blog");
    let mut blog = api.get("Pod", &namespace, "blog").await?;
    info!("Got blog pod with containers: {}", blog.field("spec.containers")?);

    // Replace its labels
    info!("Update Pod blog");
    blog["metadata"]["labels"] = json!({"app": "blog"});
    let updated = api.update(&blog).await?;
    info!("Updated labels: {}", updated.field("metadata.labels")?);

    let matching = api.list_with_labels("Pod", &namespace, [("app", "blog")]).await?;
    info!("{} pods labelled app=blog", matching["items"].as_array().map_or(0, Vec::len));

    api.delete("Pod", &namespace, "blog").await?;
    info!("Deleting blog");
    Ok(())
}
