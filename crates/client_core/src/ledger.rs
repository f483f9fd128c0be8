use std::sync::Arc;

use shared::{
    error::ClientError,
    protocol::{Account, Category, NewAccount, NewCategory, NewTransaction, Page, Transaction},
};

use crate::{gateway::ApiGateway, session::SessionController};

/// Thin typed pass-through for the account/category/transaction CRUD
/// screens. No invariants beyond the wire types; the server owns the data.
pub struct LedgerClient {
    gateway: Arc<ApiGateway>,
    session: Arc<SessionController>,
}

impl LedgerClient {
    pub fn new(gateway: Arc<ApiGateway>, session: Arc<SessionController>) -> Self {
        Self { gateway, session }
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, ClientError> {
        self.session
            .guard(self.gateway.get("/accounts").await)
            .await
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, ClientError> {
        self.session
            .guard(self.gateway.post("/accounts", account).await)
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.session
            .guard(self.gateway.get("/categories").await)
            .await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ClientError> {
        self.session
            .guard(self.gateway.post("/categories", category).await)
            .await
    }

    pub async fn list_transactions(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Vec<Transaction>, ClientError> {
        let path = format!("/transactions?page={page}&size={size}&sort=txnDate,desc");
        let page: Page<Transaction> = self.session.guard(self.gateway.get(&path).await).await?;
        Ok(page.content)
    }

    pub async fn create_transaction(&self, txn: &NewTransaction) -> Result<(), ClientError> {
        self.session
            .guard(self.gateway.post_discard("/transactions", txn).await)
            .await
    }
}
