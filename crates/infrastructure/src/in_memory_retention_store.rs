use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ephemail_application::RetentionStore;
use ephemail_core::{AppError, AppResult};
use ephemail_domain::{
    AddressRecord, CleanupCategory, CleanupTarget, CustomCleanupRule, DeletionRule, MailRecord,
    RetentionWindow, SentMailRecord,
};
use tokio::sync::RwLock;


#[derive(Debug, Default)]
struct MailDatastore {
    mails: Vec<MailRecord>,
    sendbox: Vec<SentMailRecord>,
    addresses: Vec<AddressRecord>,
}

/// In-memory retention store implementation.
///
/// Holds the mail datastore tables in process; address bindings live on the
/// address record and are dropped with it.
#[derive(Debug, Default)]
pub struct InMemoryRetentionStore {
    datastore: RwLock<MailDatastore>,
}

impl InMemoryRetentionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an inbound mail.
    pub async fn insert_mail(&self, mail: MailRecord) {
        self.datastore.write().await.mails.push(mail);
    }

    /// Stores an outbound mail.
    pub async fn insert_sent_mail(&self, mail: SentMailRecord) {
        self.datastore.write().await.sendbox.push(mail);
    }

    /// Stores an address.
    pub async fn insert_address(&self, address: AddressRecord) {
        self.datastore.write().await.addresses.push(address);
    }

    /// Returns the stored inbound mails.
    pub async fn mails(&self) -> Vec<MailRecord> {
        self.datastore.read().await.mails.clone()
    }

    /// Returns the stored outbound mails.
    pub async fn sent_mails(&self) -> Vec<SentMailRecord> {
        self.datastore.read().await.sendbox.clone()
    }

    /// Returns the stored addresses.
    pub async fn addresses(&self) -> Vec<AddressRecord> {
        self.datastore.read().await.addresses.clone()
    }
}

#[async_trait]
impl RetentionStore for InMemoryRetentionStore {
    async fn delete(&self, rule: &DeletionRule) -> AppResult<u64> {
        let now = Utc::now();
        let mut datastore = self.datastore.write().await;

        let deleted = match rule {
            DeletionRule::Category { category, window } => {
                datastore.sweep(*category, *window, now)?
            }
            DeletionRule::Custom(rule) => datastore.run_custom_rule(rule, now)?,
        };

        u64::try_from(deleted)
            .map_err(|error| AppError::Internal(format!("invalid deleted row count: {error}")))
    }
}

impl MailDatastore {
    fn sweep(
        &mut self,
        category: CleanupCategory,
        window: RetentionWindow,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let cutoff = window.cutoff(now)?;

        let deleted = match category {
            CleanupCategory::Mails => retain_counting(&mut self.mails, |mail| {
                mail.created_at >= cutoff
            }),
            CleanupCategory::UnroutedMails => {
                let addresses = &self.addresses;
                retain_counting(&mut self.mails, |mail| {
                    mail.created_at >= cutoff || !mail.is_unrouted(addresses)
                })
            }
            CleanupCategory::Sendbox => retain_counting(&mut self.sendbox, |mail| {
                mail.created_at >= cutoff
            }),
            CleanupCategory::AddressByCreation => {
                retain_counting(&mut self.addresses, |address| address.created_at >= cutoff)
            }
            CleanupCategory::InactiveAddress => {
                retain_counting(&mut self.addresses, |address| address.updated_at >= cutoff)
            }
            CleanupCategory::UnboundAddress => retain_counting(&mut self.addresses, |address| {
                address.created_at >= cutoff || address.bound
            }),
            CleanupCategory::EmptyAddress => {
                let mails = &self.mails;
                retain_counting(&mut self.addresses, |address| {
                    address.created_at >= cutoff || address.mail_count(mails) > 0
                })
            }
        };

        Ok(deleted)
    }

    fn run_custom_rule(
        &mut self,
        rule: &CustomCleanupRule,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let filter = &rule.filter;
        if filter.is_empty() {
            return Err(AppError::Validation(format!(
                "custom cleanup rule '{}' has no deletion conditions",
                rule.name
            )));
        }
        filter.validate()?;

        let deleted = match filter.target {
            CleanupTarget::Mails => retain_counting(&mut self.mails, |mail| {
                !filter.matches(&mail.address, Some(mail.raw.as_str()), mail.created_at, now)
            }),
            CleanupTarget::Sendbox => retain_counting(&mut self.sendbox, |mail| {
                !filter.matches(&mail.address, Some(mail.raw.as_str()), mail.created_at, now)
            }),
            CleanupTarget::Address => retain_counting(&mut self.addresses, |address| {
                !filter.matches(&address.name, None, address.created_at, now)
            }),
        };

        Ok(deleted)
    }
}

fn retain_counting<T>(records: &mut Vec<T>, keep: impl FnMut(&T) -> bool) -> usize {
    let before = records.len();
    records.retain(keep);
    before - records.len()
}
