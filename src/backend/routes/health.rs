//! Health endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::backend::realtime::RelayHub;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// Identities with a live chat connection on this process
    pub online: usize,
    pub store: &'static str,
}

pub async fn health_handler(State(hub): State<RelayHub>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        online: hub.presence().online_count(),
        store: hub.store_backend(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::messaging::InMemoryMessageStore;
    use crate::backend::realtime::{ConnectionHandle, RelaySettings};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_reports_presence_and_store() {
        let hub = RelayHub::new(Arc::new(InMemoryMessageStore::new()), RelaySettings::default());
        let (handle, _rx) = ConnectionHandle::channel(1);
        hub.presence().register("u1", handle);

        let Json(status) = health_handler(State(hub)).await;
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"status": "ok", "online": 1, "store": "memory"})
        );
    }
}
