//! Records owned by the mail datastore that retention sweeps operate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound message stored for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRecord {
    /// Datastore identifier.
    pub id: i64,
    /// Recipient address the message was delivered to.
    pub address: String,
    /// Raw RFC 5322 content.
    pub raw: String,
    /// Arrival time.
    pub created_at: DateTime<Utc>,
}

/// Outbound message recorded in the sendbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMailRecord {
    /// Datastore identifier.
    pub id: i64,
    /// Sending address.
    pub address: String,
    /// Raw content including metadata.
    pub raw: String,
    /// Time the message was sent.
    pub created_at: DateTime<Utc>,
}

/// Generated inbox identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Datastore identifier.
    pub id: i64,
    /// Full address string.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last activity time.
    pub updated_at: DateTime<Utc>,
    /// Whether the address is bound to a user account.
    pub bound: bool,
}

impl AddressRecord {
    /// Counts the mails delivered to this address.
    #[must_use]
    pub fn mail_count<'a>(&self, mails: impl IntoIterator<Item = &'a MailRecord>) -> usize {
        mails
            .into_iter()
            .filter(|mail| mail.address == self.name)
            .count()
    }
}

impl MailRecord {
    /// Returns whether no address record routes this mail.
    #[must_use]
    pub fn is_unrouted<'a>(&self, addresses: impl IntoIterator<Item = &'a AddressRecord>) -> bool {
        !addresses
            .into_iter()
            .any(|address| address.name == self.address)
    }
}
