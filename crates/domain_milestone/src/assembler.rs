//! Document assembly and delivery bookkeeping

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use core_kernel::OperationMetadata;
use domain_shipment::{ShipmentRecord, TrackedRecord};

use crate::config::{delivery_folder, NotificationConfig};
use crate::data::{Data315, DocumentHeader, MilestoneUpdate};
use crate::delivery::{DeliveryRecord, OutboundDocument};
use crate::error::MilestoneError;
use crate::modules::strategy;
use crate::port_location::PortLocationResolver;
use crate::ports::{DeliveryRecordRepository, DocumentDelivery};
use crate::splitter::{split, IdentifierSet};
use crate::xml::XmlGenerator;

/// Default time between a send and its confirmation
pub fn default_confirmation_grace() -> Duration {
    Duration::minutes(1)
}

/// Builds 315 payloads, writes batches and records confirmed sends
#[derive(Clone)]
pub struct DocumentAssembler {
    delivery: Arc<dyn DocumentDelivery>,
    delivery_records: Arc<dyn DeliveryRecordRepository>,
    ports: PortLocationResolver,
    xml: XmlGenerator,
    confirmation_grace: Duration,
}

impl DocumentAssembler {
    pub fn new(
        delivery: Arc<dyn DocumentDelivery>,
        delivery_records: Arc<dyn DeliveryRecordRepository>,
        ports: PortLocationResolver,
    ) -> Self {
        Self {
            delivery,
            delivery_records,
            ports,
            xml: XmlGenerator::new(),
            confirmation_grace: default_confirmation_grace(),
        }
    }

    pub fn with_confirmation_grace(mut self, grace: Duration) -> Self {
        self.confirmation_grace = grace;
        self
    }

    /// Extracts the record-level document content
    ///
    /// Fails with [`MilestoneError::MissingUnLocode`] when a Canadian
    /// entry's CBSA port of entry has no UN/LOCODE.
    pub async fn document_header(&self, record: &ShipmentRecord) -> Result<Arc<DocumentHeader>, MilestoneError> {
        strategy(record).header(&self.ports).await.map(Arc::new)
    }

    /// Builds one payload for an identifier tuple and an update
    pub async fn create_data(
        &self,
        record: &ShipmentRecord,
        identifiers: &IdentifierSet,
        update: &MilestoneUpdate,
    ) -> Result<Data315, MilestoneError> {
        let header = self.document_header(record).await?;
        Ok(Data315::new(header, identifiers.clone(), update.clone()))
    }

    /// Writes one batch for a partner and confirms its channels
    ///
    /// Delivery state is persisted only after the file was written, and
    /// never for test batches. The channels of a batch are saved together;
    /// when that save fails the batch is already out and
    /// [`MilestoneError::Unconfirmed`] is returned. Returns the payloads
    /// that were sent.
    #[instrument(skip(self, documents, metadata), fields(documents = documents.len()))]
    pub async fn generate_and_send_document(
        &self,
        partner_key: &str,
        documents: Vec<Data315>,
        is_test: bool,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Data315>, MilestoneError> {
        if documents.is_empty() {
            return Ok(documents);
        }

        let outbound = OutboundDocument {
            folder: delivery_folder(partner_key, is_test),
            file_name: file_name(partner_key),
            content: self.xml.render_batch(&documents)?,
        };

        self.delivery
            .deliver(&outbound)
            .await
            .map_err(|source| MilestoneError::Delivery {
                partner: partner_key.to_string(),
                source,
            })?;

        info!(
            partner = %partner_key,
            folder = %outbound.folder,
            file = %outbound.file_name,
            documents = documents.len(),
            "Delivered 315 batch"
        );

        if is_test {
            return Ok(documents);
        }

        let now = Utc::now();
        let mut seen = HashSet::new();
        let confirmed: Vec<DeliveryRecord> = documents
            .iter()
            .map(Data315::delivery)
            .filter(|delivery| seen.insert(delivery.id))
            .map(|delivery| {
                let mut delivery = delivery.as_ref().clone();
                delivery.mark_sent(now, self.confirmation_grace);
                delivery
            })
            .collect();

        self.delivery_records
            .save_all(&confirmed, metadata)
            .await
            .map_err(|source| MilestoneError::Unconfirmed {
                partner: partner_key.to_string(),
                documents: documents.len(),
                source,
            })?;
        debug!(channels = confirmed.len(), "Confirmed channels");

        Ok(documents)
    }

    /// Sends every identifier tuple of `record` for every update in one batch
    pub async fn generate_and_send_all(
        &self,
        config: &NotificationConfig,
        record: &ShipmentRecord,
        updates: &[MilestoneUpdate],
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Data315>, MilestoneError> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let header = self.document_header(record).await?;
        let tuples = split(&strategy(record).identifiers(), config.output_style);

        let documents: Vec<Data315> = tuples
            .iter()
            .flat_map(|identifiers| {
                let header = Arc::clone(&header);
                updates
                    .iter()
                    .map(move |update| Data315::new(Arc::clone(&header), identifiers.clone(), update.clone()))
            })
            .collect();

        debug!(
            record = %record.natural_key(),
            tuples = tuples.len(),
            updates = updates.len(),
            "Assembled 315 documents"
        );

        self.generate_and_send_document(&config.partner_key, documents, config.testing, metadata)
            .await
    }
}

impl std::fmt::Debug for DocumentAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAssembler")
            .field("confirmation_grace", &self.confirmation_grace)
            .finish_non_exhaustive()
    }
}

/// `315_<partner>_<yyyyMMddHHmmssSSS>_<short uuid>.xml`
pub fn file_name(partner_key: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "315_{}_{}_{}.xml",
        partner_key.trim(),
        Utc::now().format("%Y%m%d%H%M%S%3f"),
        &id[..8]
    )
}
