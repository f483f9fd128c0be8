use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(AccountId);
id_newtype!(CategoryId);
id_newtype!(TransactionId);
id_newtype!(ProposalId);

/// Lifecycle of a server-generated transaction proposal. `Pending` is the
/// only non-terminal state; accept/reject each transition exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// Client-held pairing of a bearer token and the identity it represents.
/// Token absent means unauthenticated; the email is only meaningful while a
/// token is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub subject_email: Option<String>,
}

impl Session {
    pub fn authenticated(token: impl Into<String>, subject_email: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            subject_email: Some(subject_email.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
