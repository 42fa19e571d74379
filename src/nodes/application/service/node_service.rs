//! Source listing, node id resolution and concurrent temperature pushes.

use crate::{
    TcwResult,
    config::{API_NODES_ENDPOINT, SOURCE_NAME_ATTRIBUTE},
    core::{
        domain::model::{
            node::{NodeAttributeRow, NodesResponse},
            pending_update::{PendingUpdate, TemperatureInput},
        },
        infrastructure::{api_client::ApiClient, http_session::HttpSession},
    },
};
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Operations on the node collection of one server.
#[derive(Debug, Clone)]
pub struct NodeService {
    api: Arc<ApiClient>,
}

impl NodeService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetches all nodes with their attributes.
    pub async fn fetch_nodes(&self) -> TcwResult<NodesResponse> {
        let session = self.api.open_session()?;
        self.api
            .get(&session, &format!("{}?getAttributes=True", API_NODES_ENDPOINT))
            .await
    }

    /// Distinct `sourceName` values, sorted ascending.
    ///
    /// A failed request yields an empty list, same as a server without sources.
    pub async fn list_sources(&self) -> Vec<String> {
        match self.fetch_nodes().await {
            Ok(response) => extract_sources(&response),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot list sources");
                Vec::new()
            }
        }
    }

    /// Pairs every attribute whose value is one of `labels` with its node id.
    ///
    /// A label carried by several nodes yields one row per node. A failed
    /// request yields no rows.
    pub async fn resolve_node_ids(&self, labels: &HashSet<String>) -> Vec<NodeAttributeRow> {
        match self.fetch_nodes().await {
            Ok(response) => {
                let rows = filter_rows(&response, labels);
                warn_on_duplicate_labels(&rows);
                rows
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot resolve node ids");
                Vec::new()
            }
        }
    }

    /// Patches every update concurrently; true only if all of them succeed.
    ///
    /// Patches already sent are neither cancelled nor rolled back when another
    /// one fails, so a `false` result may leave some nodes updated.
    pub async fn push_updates(&self, updates: &[PendingUpdate]) -> bool {
        if updates.is_empty() {
            return true;
        }
        if let Err(e) = self.api.get_token().await {
            tracing::warn!(error = %e, "Cannot push temperatures without a token");
            return false;
        }
        let session = match self.api.open_session() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open session for push");
                return false;
            }
        };

        let results = join_all(
            updates
                .iter()
                .map(|update| self.push_single(&session, update)),
        )
        .await;

        let failed = results.iter().filter(|ok| !**ok).count();
        if failed == 0 {
            tracing::info!(nodes = updates.len(), "Temperatures pushed");
        } else {
            tracing::warn!(failed, total = updates.len(), "Temperature push incomplete");
        }
        failed == 0
    }

    async fn push_single(&self, session: &HttpSession, update: &PendingUpdate) -> bool {
        let path = format!("{}/{}", API_NODES_ENDPOINT, update.node_id);
        match self
            .api
            .patch(session, &path, &update.patch_document())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(node_id = %update.node_id, error = %e, "Node patch failed");
                false
            }
        }
    }

    /// Joins resolved rows with entered values on the label.
    ///
    /// Every matching combination becomes an update; unmatched labels on
    /// either side are dropped.
    #[must_use]
    pub fn merge(resolved: &[NodeAttributeRow], inputs: &[TemperatureInput]) -> Vec<PendingUpdate> {
        resolved
            .iter()
            .flat_map(|row| {
                inputs
                    .iter()
                    .filter(move |input| input.source == row.attribute_value)
                    .map(move |input| PendingUpdate::new(&row.node_id, input.temperature.value()))
            })
            .collect()
    }
}

fn extract_sources(response: &NodesResponse) -> Vec<String> {
    response
        .attributes()
        .filter(|attr| attr.code.as_deref() == Some(SOURCE_NAME_ATTRIBUTE))
        .filter_map(|attr| attr.value.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn filter_rows(response: &NodesResponse, labels: &HashSet<String>) -> Vec<NodeAttributeRow> {
    response
        .attributes()
        .filter_map(|attr| {
            let value = attr.value.as_ref()?;
            let node_id = attr.node_id.as_ref()?;
            labels
                .contains(value)
                .then(|| NodeAttributeRow::new(value, node_id))
        })
        .collect()
}

fn warn_on_duplicate_labels(rows: &[NodeAttributeRow]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.attribute_value.as_str()).or_default() += 1;
    }
    for (label, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
        tracing::warn!(label, count, "Source label is carried by several nodes");
    }
}
