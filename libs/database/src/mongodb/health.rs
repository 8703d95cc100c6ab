use mongodb::{Client, bson::doc};

/// `true` when the server answers a ping within the client's selection timeout.
pub async fn check_health(client: &Client) -> bool {
    match client.database("admin").run_command(doc! { "ping": 1 }).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "MongoDB ping failed");
            false
        }
    }
}
