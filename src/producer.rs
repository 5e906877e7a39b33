//! NATS message producer for risk decisions

use crate::types::decision::RiskDecision;
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing risk decisions to NATS
#[derive(Clone)]
pub struct DecisionProducer {
    client: Client,
    subject: String,
}

impl DecisionProducer {
    /// Create a new decision producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a risk decision
    pub async fn publish(&self, decision: &RiskDecision) -> Result<()> {
        let payload = serde_json::to_vec(decision)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            decision_id = %decision.decision_id,
            application_id = %decision.application_id,
            probability_of_default = decision.probability_of_default,
            "Published risk decision"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
