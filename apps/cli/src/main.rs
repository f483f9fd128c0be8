use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use client_core::{
    ApiGateway, DashboardAggregator, LedgerClient, ProposalWorkflow, SessionController,
};
use shared::{
    domain::{ProposalId, TransactionKind},
    protocol::{NewAccount, NewCategory, NewTransaction},
};
use storage::SessionStore;

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Personal finance tracking client")]
struct Args {
    /// Base URL of the backend API.
    #[arg(long, env = "EXPENSES_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    /// Directory for local state; defaults to ~/.tally.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account on the server and log in with it.
    Register { email: String, password: String },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Submit a free-text expense description for ingestion.
    Ingest {
        text: String,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// List proposals awaiting a decision.
    Proposals,
    Accept {
        id: i64,
    },
    Reject {
        id: i64,
    },
    Dashboard {
        #[arg(long, default_value_t = 5)]
        recent: u32,
    },
    Accounts,
    AddAccount {
        name: String,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        last4: Option<String>,
    },
    Categories,
    AddCategory {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    Transactions {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    AddTransaction {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long, value_enum, default_value_t = KindArg::Debit)]
        kind: KindArg,
        #[arg(long)]
        category: Option<i64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Credit,
    Debit,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Credit => TransactionKind::Credit,
            KindArg::Debit => TransactionKind::Debit,
        }
    }
}

fn session_db_url(data_dir: Option<PathBuf>) -> String {
    let dir = data_dir.unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tally")
    });
    format!("sqlite://{}", dir.join("session.db").display())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let store = SessionStore::open(&session_db_url(args.data_dir)).await?;
    let gateway = Arc::new(ApiGateway::new(args.server_url, store.clone()));
    let session = SessionController::new(Arc::clone(&gateway), store);
    session.bootstrap().await;

    match args.command {
        Command::Register { email, password } => {
            session.register(&email, &password).await?;
            println!("Registered and logged in as {email}");
        }
        Command::Login { email, password } => {
            session.login(&email, &password).await?;
            println!("Logged in as {email}");
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Command::Ingest { text, currency } => {
            let workflow = ProposalWorkflow::new(gateway, session);
            let pending = workflow.submit(&text, &currency).await?;
            println!("{} proposal(s) pending:", pending.len());
            print_proposals(&pending);
        }
        Command::Proposals => {
            let workflow = ProposalWorkflow::new(gateway, session);
            let pending = workflow.list_pending().await?;
            print_proposals(&pending);
        }
        Command::Accept { id } => {
            let workflow = ProposalWorkflow::new(gateway, session);
            workflow.accept(ProposalId(id)).await?;
            println!("Accepted proposal {id}");
        }
        Command::Reject { id } => {
            let workflow = ProposalWorkflow::new(gateway, session);
            workflow.reject(ProposalId(id)).await?;
            println!("Rejected proposal {id}");
        }
        Command::Dashboard { recent } => {
            let dashboard = DashboardAggregator::new(gateway, session);
            let summary = dashboard.summary(recent).await?;
            println!("Total balance: {}", summary.total_balance);
            println!("Accounts:");
            for account in &summary.accounts {
                println!(
                    "  [{}] {} {}",
                    account.id.0,
                    account.name,
                    account
                        .balance_estimate
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("Recent transactions:");
            for txn in &summary.recent_transactions {
                println!(
                    "  [{}] {} {} {} {}",
                    txn.id.0,
                    txn.txn_date.format("%Y-%m-%d"),
                    txn.merchant.as_deref().unwrap_or("-"),
                    txn.amount,
                    txn.currency.as_deref().unwrap_or(""),
                );
            }
        }
        Command::Accounts => {
            let ledger = LedgerClient::new(gateway, session);
            for account in ledger.list_accounts().await? {
                println!(
                    "[{}] {} ({}) {}",
                    account.id.0,
                    account.name,
                    account.kind.as_deref().unwrap_or("-"),
                    account
                        .balance_estimate
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        Command::AddAccount { name, kind, last4 } => {
            let ledger = LedgerClient::new(gateway, session);
            let created = ledger
                .create_account(&NewAccount { name, kind, last4 })
                .await?;
            println!("Created account [{}] {}", created.id.0, created.name);
        }
        Command::Categories => {
            let ledger = LedgerClient::new(gateway, session);
            for category in ledger.list_categories().await? {
                println!(
                    "[{}] {} {}",
                    category.id.0,
                    category.name,
                    category.parent.as_deref().unwrap_or(""),
                );
            }
        }
        Command::AddCategory { name, parent } => {
            let ledger = LedgerClient::new(gateway, session);
            let created = ledger.create_category(&NewCategory { name, parent }).await?;
            println!("Created category [{}] {}", created.id.0, created.name);
        }
        Command::Transactions { page, size } => {
            let ledger = LedgerClient::new(gateway, session);
            for txn in ledger.list_transactions(page, size).await? {
                println!(
                    "[{}] {} {} {} {} {}",
                    txn.id.0,
                    txn.txn_date.format("%Y-%m-%d"),
                    txn.merchant.as_deref().unwrap_or("-"),
                    txn.amount,
                    txn.currency.as_deref().unwrap_or(""),
                    txn.category_name.as_deref().unwrap_or(""),
                );
            }
        }
        Command::AddTransaction {
            account,
            merchant,
            amount,
            currency,
            kind,
            category,
        } => {
            let ledger = LedgerClient::new(gateway, session);
            ledger
                .create_transaction(&NewTransaction {
                    account_id: shared::domain::AccountId(account),
                    merchant,
                    amount,
                    currency,
                    kind: kind.into(),
                    category_id: category.map(shared::domain::CategoryId),
                })
                .await?;
            println!("Recorded transaction");
        }
    }

    Ok(())
}

fn print_proposals(pending: &[shared::protocol::Proposal]) {
    for proposal in pending {
        println!(
            "[{}] {} {} at {} ({})",
            proposal.id.0,
            proposal.amount,
            proposal.currency.as_deref().unwrap_or(""),
            proposal.merchant.as_deref().unwrap_or("unknown merchant"),
            proposal.created_at.format("%Y-%m-%d"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_falls_back_to_environment() {
        std::env::set_var("EXPENSES_SERVER_URL", "http://env.test:9");

        let from_env = Args::parse_from(["tally", "logout"]);
        assert_eq!(from_env.server_url, "http://env.test:9");

        let from_flag =
            Args::parse_from(["tally", "--server-url", "http://flag.test:1", "logout"]);
        assert_eq!(from_flag.server_url, "http://flag.test:1");

        std::env::remove_var("EXPENSES_SERVER_URL");
    }
}
