use std::sync::Arc;

use h5meta_store::{EntryMetadata, MetadataStore, StoreError};
use h5meta_types::MetadataRecord;
use tracing::{debug, warn};

use crate::error::PublishError;

/// Result of publishing one container's metadata.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Entry created and metadata attached.
    Published,
    /// Entry created, but attaching the metadata failed.
    Partial { error: StoreError },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Publishes walk results into a metadata store.
#[derive(Clone)]
pub struct MetadataPublisher {
    store: Arc<dyn MetadataStore>,
}

impl MetadataPublisher {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    /// Create the entry at `target`, close it, then attach the flattened
    /// metadata of `record`.
    ///
    /// Create or close failures are errors; an attach failure leaves the
    /// entry in place and yields [`PublishOutcome::Partial`].
    pub fn publish(
        &self,
        target: &str,
        record: &MetadataRecord,
    ) -> Result<PublishOutcome, PublishError> {
        let create_failed = |source: StoreError| PublishError::StoreCreate {
            path: target.to_string(),
            source,
        };
        let handle = self.store.create_entry(target).map_err(create_failed)?;
        self.store.close_entry(handle).map_err(create_failed)?;

        let metadata = EntryMetadata::from_record(record);
        match self.store.attach_metadata(target, &metadata) {
            Ok(()) => {
                debug!(path = target, entries = metadata.len(), digest = %metadata.digest, "published");
                Ok(PublishOutcome::Published)
            }
            Err(error) => {
                warn!(path = target, %error, "metadata not attached");
                Ok(PublishOutcome::Partial { error })
            }
        }
    }
}

impl std::fmt::Debug for MetadataPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataPublisher").finish_non_exhaustive()
    }
}
