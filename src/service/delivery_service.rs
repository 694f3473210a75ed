use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{DeliveryAgentRepository, OrderRepository},
};

/// Agent roster management. Assignment and completion live on `OrderService`.
pub struct DeliveryService {
    repo: Arc<dyn DeliveryAgentRepository>,
    order_repo: Arc<dyn OrderRepository>,
}

impl DeliveryService {
    pub fn new(repo: Arc<dyn DeliveryAgentRepository>, order_repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo, order_repo }
    }

    pub async fn create(&self, request: CreateAgentRequest) -> Result<DeliveryAgent> {
        request.validate()?;
        let agent = self.repo.create(&request).await?;
        info!(agent_id = %agent.id, "Delivery agent registered");
        Ok(agent)
    }

    pub async fn get(&self, id: Uuid) -> Result<DeliveryAgent> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery agent not found".to_string()))
    }

    pub async fn list(&self, status: Option<AgentStatus>, page: PageParams) -> Result<Page<DeliveryAgent>> {
        let (agents, total) = self.repo.list(status, page).await?;
        Ok(Page::new(agents, total, page))
    }

    pub async fn available(&self) -> Result<Vec<DeliveryAgent>> {
        let page = PageParams {
            page: 1,
            size: PageParams::MAX_SIZE,
        };
        let (agents, _) = self.repo.list(Some(AgentStatus::Active), page).await?;
        Ok(agents)
    }

    pub async fn update(&self, id: Uuid, update: UpdateAgentRequest) -> Result<DeliveryAgent> {
        update.validate()?;
        self.repo.update(id, &update).await
    }

    pub async fn set_status(&self, id: Uuid, status: AgentStatus) -> Result<DeliveryAgent> {
        let agent = self.repo.set_status(id, status).await?;
        info!(agent_id = %id, status = status.as_str(), "Delivery agent status changed");
        Ok(agent)
    }

    pub async fn orders_for(&self, agent_id: Uuid) -> Result<Vec<Order>> {
        self.get(agent_id).await?;
        self.order_repo.list_by_agent(agent_id).await
    }

    pub async fn stats(&self) -> Result<DeliveryStats> {
        self.repo.stats().await
    }
}
