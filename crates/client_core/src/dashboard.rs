use std::sync::Arc;

use rust_decimal::Decimal;

use shared::{
    error::ClientError,
    protocol::{Account, Page, Transaction},
};

use crate::{gateway::ApiGateway, session::SessionController};

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub total_balance: Decimal,
    pub accounts: Vec<Account>,
    pub recent_transactions: Vec<Transaction>,
}

/// Read-only composition of accounts and recent activity. No caching: every
/// call fetches fresh, and a failed fetch yields the error rather than
/// stale data.
pub struct DashboardAggregator {
    gateway: Arc<ApiGateway>,
    session: Arc<SessionController>,
}

impl DashboardAggregator {
    pub fn new(gateway: Arc<ApiGateway>, session: Arc<SessionController>) -> Self {
        Self { gateway, session }
    }

    /// The two reads are independent and issued concurrently, joined before
    /// the summary is assembled.
    pub async fn summary(&self, recent_limit: u32) -> Result<DashboardSummary, ClientError> {
        let accounts_fut = self.gateway.get::<Vec<Account>>("/accounts");
        let transactions_path =
            format!("/transactions?page=0&size={recent_limit}&sort=txnDate,desc");
        let transactions_fut = self.gateway.get::<Page<Transaction>>(&transactions_path);
        let (accounts, transactions) = futures::join!(accounts_fut, transactions_fut);

        let accounts = self.session.guard(accounts).await?;
        let transactions = self.session.guard(transactions).await?;

        let total_balance: Decimal = accounts
            .iter()
            .filter_map(|account| account.balance_estimate)
            .sum();

        Ok(DashboardSummary {
            total_balance,
            accounts,
            recent_transactions: transactions.content,
        })
    }
}
