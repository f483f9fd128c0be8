pub mod dashboard;
pub mod gateway;
pub mod ledger;
pub mod proposals;
pub mod session;

pub use dashboard::{DashboardAggregator, DashboardSummary};
pub use gateway::ApiGateway;
pub use ledger::LedgerClient;
pub use proposals::ProposalWorkflow;
pub use session::{AuthState, SessionController, SessionEvent};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
