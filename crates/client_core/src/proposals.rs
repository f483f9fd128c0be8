use std::sync::Arc;

use tokio::sync::Mutex;

use shared::{
    domain::{ProposalId, ProposalStatus},
    error::ClientError,
    protocol::{IngestRequest, IngestResponse, Proposal},
};

use crate::{gateway::ApiGateway, session::SessionController};

/// Drives free-text submissions through the ingestion service and each
/// resulting proposal through accept/reject.
///
/// The locally-held pending set is a cache of the server's PENDING
/// proposals. Accept/reject remove entries optimistically after the server
/// confirms the transition; the cache may transiently diverge from server
/// truth until the next `list_pending`, which is accepted behavior.
pub struct ProposalWorkflow {
    gateway: Arc<ApiGateway>,
    session: Arc<SessionController>,
    pending: Mutex<Vec<Proposal>>,
}

impl ProposalWorkflow {
    pub fn new(gateway: Arc<ApiGateway>, session: Arc<SessionController>) -> Self {
        Self {
            gateway,
            session,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Sends raw text to the ingestion service, then re-fetches the pending
    /// queue. The re-fetch is sequenced strictly after the submit response
    /// and is authoritative: one submission may yield zero, one, or several
    /// proposals. On failure nothing is created locally and the caller
    /// keeps the text for retry.
    pub async fn submit(
        &self,
        raw_text: &str,
        currency: &str,
    ) -> Result<Vec<Proposal>, ClientError> {
        if raw_text.trim().is_empty() {
            return Err(ClientError::Validation(
                "expense description must not be empty".to_string(),
            ));
        }

        let request = IngestRequest {
            raw_text: raw_text.to_string(),
            currency: currency.to_string(),
        };
        let _ack: IngestResponse = self
            .session
            .guard(self.gateway.post("/ingest", &request).await)
            .await?;

        self.list_pending().await
    }

    /// Fetches all proposals, keeps the PENDING ones in server order, and
    /// replaces the local pending set with them.
    pub async fn list_pending(&self) -> Result<Vec<Proposal>, ClientError> {
        let all: Vec<Proposal> = self
            .session
            .guard(self.gateway.get("/proposals").await)
            .await?;

        let pending: Vec<Proposal> = all
            .into_iter()
            .filter(|p| p.status == ProposalStatus::Pending)
            .collect();
        *self.pending.lock().await = pending.clone();
        Ok(pending)
    }

    pub async fn accept(&self, id: ProposalId) -> Result<(), ClientError> {
        self.resolve(id, "accept").await
    }

    pub async fn reject(&self, id: ProposalId) -> Result<(), ClientError> {
        self.resolve(id, "reject").await
    }

    /// Snapshot of the locally-held pending set, no I/O.
    pub async fn pending(&self) -> Vec<Proposal> {
        self.pending.lock().await.clone()
    }

    async fn resolve(&self, id: ProposalId, action: &str) -> Result<(), ClientError> {
        let path = format!("/proposals/{}/{action}", id.0);
        self.session
            .guard(self.gateway.post_discard(&path, &serde_json::json!({})).await)
            .await?;

        // Optimistic removal; an id already absent stays absent.
        self.pending.lock().await.retain(|p| p.id != id);
        Ok(())
    }
}
