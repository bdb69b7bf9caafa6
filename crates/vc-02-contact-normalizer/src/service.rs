//! # Contact Normalizer Service
//!
//! Implements `ContactApi` over a `ContactSource`.

use async_trait::async_trait;
use shared_types::Contact;
use tracing::{debug, trace};

use crate::domain::{sanitize, ContactError, ContactStats, Rejection};
use crate::ports::{ContactApi, ContactSource};

/// Contact Normalizer Service.
pub struct ContactNormalizer<S: ContactSource> {
    source: S,
}

impl<S: ContactSource> ContactNormalizer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load contacts and report what was dropped.
    pub async fn load_with_stats(&self) -> Result<(Vec<Contact>, ContactStats), ContactError> {
        let raw = self.source.read_contacts().await?;
        let mut stats = ContactStats {
            read: raw.len(),
            ..ContactStats::default()
        };

        let mut contacts = Vec::with_capacity(raw.len());
        for (index, record) in raw.iter().enumerate() {
            match sanitize(record) {
                Ok(contact) => contacts.push(contact),
                Err(rejection) => {
                    trace!(index, ?rejection, "[ContactNormalizer] Record skipped");
                    match rejection {
                        Rejection::MissingName => stats.missing_name += 1,
                        Rejection::MissingPhone => stats.missing_phone += 1,
                        Rejection::EmptyPhone => stats.empty_phone += 1,
                    }
                }
            }
        }
        stats.loaded = contacts.len();

        debug!(
            read = stats.read,
            loaded = stats.loaded,
            skipped = stats.skipped(),
            "[ContactNormalizer] Contacts loaded"
        );
        Ok((contacts, stats))
    }
}

#[async_trait]
impl<S: ContactSource> ContactApi for ContactNormalizer<S> {
    async fn load_contacts(&self) -> Result<Vec<Contact>, ContactError> {
        self.load_with_stats().await.map(|(contacts, _)| contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryContactSource;
    use crate::domain::RawContact;

    fn normalizer(records: Vec<RawContact>) -> ContactNormalizer<InMemoryContactSource> {
        ContactNormalizer::new(InMemoryContactSource::new(records))
    }

    #[tokio::test]
    async fn test_load_contacts_examples() {
        let normalizer = normalizer(vec![
            RawContact::new(Some("Intl"), Some("+44 20 7946 0958")),
            RawContact::new(Some("Jane Doe"), Some("(555) 123-4567")),
            RawContact::new(Some("No Phone"), Some("   ")),
        ]);

        let contacts = normalizer.load_contacts().await.unwrap();

        assert_eq!(
            contacts,
            vec![
                Contact::new("Intl", "+442079460958").unwrap(),
                Contact::new("Jane Doe", "5551234567").unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_store_order_is_preserved() {
        let normalizer = normalizer(vec![
            RawContact::new(Some("Zed"), Some("3")),
            RawContact::new(Some("Amy"), Some("1")),
            RawContact::new(Some("Max"), Some("2")),
        ]);

        let names: Vec<String> = normalizer
            .load_contacts()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();

        assert_eq!(names, vec!["Zed", "Amy", "Max"]);
    }

    #[tokio::test]
    async fn test_stats_count_each_rejection() {
        let normalizer = normalizer(vec![
            RawContact::new(Some("Ok"), Some("555")),
            RawContact::new(None, Some("555")),
            RawContact::new(Some("No Number"), None),
            RawContact::new(Some("Letters"), Some("call me")),
        ]);

        let (contacts, stats) = normalizer.load_with_stats().await.unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(
            stats,
            ContactStats {
                read: 4,
                loaded: 1,
                missing_name: 1,
                missing_phone: 1,
                empty_phone: 1,
            }
        );
        assert_eq!(stats.skipped(), 3);
    }

    #[tokio::test]
    async fn test_each_call_reads_the_store_again() {
        let source = InMemoryContactSource::new(vec![RawContact::new(Some("A"), Some("1"))]);
        let normalizer = ContactNormalizer::new(source);

        assert_eq!(normalizer.load_contacts().await.unwrap().len(), 1);
        normalizer.source.push(RawContact::new(Some("B"), Some("2")));
        assert_eq!(normalizer.load_contacts().await.unwrap().len(), 2);
        assert_eq!(normalizer.source.reads(), 2);
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let source = InMemoryContactSource::new(Vec::new());
        source.deny_access();
        let normalizer = ContactNormalizer::new(source);

        assert!(matches!(
            normalizer.load_contacts().await,
            Err(ContactError::PermissionDenied)
        ));
    }
}
