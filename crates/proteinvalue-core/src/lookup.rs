use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::Result;

pub use proteinvalue_lookup::label::LabelReading;

/// What a barcode lookup gives us back, normalized to engine terms.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeHit {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub protein_per_serving: Option<f64>,
    pub serving_size: Option<String>,
}

/// Barcode database seam. Trait so the engine can be tested without a
/// network and so the backing database can be swapped.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BarcodeProvider: Send + Sync {
    /// Ok(None) means "nothing known for this code" - a perfectly normal
    /// outcome, distinct from a failed call.
    async fn lookup(&self, barcode: &str) -> Result<Option<BarcodeHit>>;
}

/// Optical label reader seam. The OCR engine itself lives outside this
/// workspace; whatever implements this turns a raster image into a
/// best-effort reading and never panics on garbage input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelReader: Send + Sync {
    async fn read(&self, image: &[u8]) -> Result<LabelReading>;
}

/// Freshness gate for in-flight scans.
///
/// Every capture/scan attempt takes a ticket; starting a new attempt (or
/// cancelling) invalidates all earlier tickets. A result is only applied if
/// its ticket is still current, so a slow lookup that resolves after the
/// user has retaken the photo cannot overwrite newer state.
#[derive(Debug, Default)]
pub struct ScanGate {
    current: AtomicU64,
}

/// Proof of which scan attempt a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket(u64);

impl ScanGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, invalidating every ticket issued before.
    pub fn begin(&self) -> ScanTicket {
        ScanTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate outstanding tickets without starting a new attempt
    /// (user hit retake/cancel).
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn accepts(&self, ticket: ScanTicket) -> bool {
        ticket.0 == self.current.load(Ordering::SeqCst)
    }
}

/// Front door for the external collaborators, owning the degrade-to-manual
/// policy: collaborator failures become advisory None results, never errors,
/// and stale results are dropped at the gate.
pub struct LookupService {
    barcode: Box<dyn BarcodeProvider>,
    gate: ScanGate,
}

impl LookupService {
    pub fn new(barcode: Box<dyn BarcodeProvider>) -> Self {
        Self {
            barcode,
            gate: ScanGate::new(),
        }
    }

    /// Take a ticket for a new scan/capture attempt.
    pub fn begin_scan(&self) -> ScanTicket {
        self.gate.begin()
    }

    /// Discard whatever is in flight.
    pub fn cancel_scan(&self) {
        self.gate.cancel()
    }

    /// Look up a barcode. Failures and misses both come back as None; the
    /// caller's fallback is always manual entry, and the core stays usable
    /// no matter what the network does.
    pub async fn lookup_barcode(&self, barcode: &str, ticket: ScanTicket) -> Option<BarcodeHit> {
        let outcome = match self.barcode.lookup(barcode).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Barcode lookup failed, falling back to manual entry: {}", e);
                None
            }
        };

        if !self.gate.accepts(ticket) {
            debug!("Discarding stale barcode result for {}", barcode);
            return None;
        }
        outcome
    }

    /// Run the optical reader over a captured image. Same contract as the
    /// barcode path: never an error, stale results never surface.
    pub async fn read_label(
        &self,
        reader: &dyn LabelReader,
        image: &[u8],
        ticket: ScanTicket,
    ) -> Option<LabelReading> {
        let reading = match reader.read(image).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Label reading failed, falling back to manual entry: {}", e);
                LabelReading::default()
            }
        };

        if !self.gate.accepts(ticket) {
            debug!("Discarding stale label reading");
            return None;
        }
        Some(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hit() -> BarcodeHit {
        BarcodeHit {
            barcode: "0123456789012".into(),
            name: "Whey X".into(),
            brand: Some("Acme".into()),
            protein_per_serving: Some(24.0),
            serving_size: Some("32 g".into()),
        }
    }

    #[test]
    fn gate_accepts_only_the_latest_ticket() {
        let gate = ScanGate::new();
        let first = gate.begin();
        assert!(gate.accepts(first));

        let second = gate.begin();
        assert!(!gate.accepts(first), "old ticket must go stale");
        assert!(gate.accepts(second));

        gate.cancel();
        assert!(!gate.accepts(second));
    }

    #[tokio::test]
    async fn lookup_returns_hit_for_current_ticket() {
        let mut provider = MockBarcodeProvider::new();
        provider
            .expect_lookup()
            .returning(|_| Ok(Some(sample_hit())));

        let service = LookupService::new(Box::new(provider));
        let ticket = service.begin_scan();
        let hit = service.lookup_barcode("0123456789012", ticket).await;
        assert_eq!(hit.map(|h| h.name), Some("Whey X".to_string()));
    }

    #[tokio::test]
    async fn stale_lookup_result_is_dropped() {
        let mut provider = MockBarcodeProvider::new();
        provider
            .expect_lookup()
            .returning(|_| Ok(Some(sample_hit())));

        let service = LookupService::new(Box::new(provider));
        let ticket = service.begin_scan();
        // User retakes before the result lands
        let _newer = service.begin_scan();

        let hit = service.lookup_barcode("0123456789012", ticket).await;
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn provider_error_degrades_to_none() {
        let mut provider = MockBarcodeProvider::new();
        provider
            .expect_lookup()
            .returning(|_| Err(crate::Error::Lookup("socket fell over".into())));

        let service = LookupService::new(Box::new(provider));
        let ticket = service.begin_scan();
        assert_eq!(service.lookup_barcode("000", ticket).await, None);
    }

    #[tokio::test]
    async fn reader_error_degrades_to_empty_reading() {
        let mut reader = MockLabelReader::new();
        reader
            .expect_read()
            .returning(|_| Err(crate::Error::Lookup("blurry".into())));

        let dummy = MockBarcodeProvider::new();
        let service = LookupService::new(Box::new(dummy));
        let ticket = service.begin_scan();

        let reading = service.read_label(&reader, &[0u8; 16], ticket).await;
        assert_eq!(reading, Some(LabelReading::default()));
    }

    #[tokio::test]
    async fn stale_label_reading_is_dropped() {
        let mut reader = MockLabelReader::new();
        reader.expect_read().returning(|_| {
            Ok(LabelReading {
                protein: Some(25.0),
                servings: Some(30),
            })
        });

        let dummy = MockBarcodeProvider::new();
        let service = LookupService::new(Box::new(dummy));
        let ticket = service.begin_scan();
        service.cancel_scan();

        assert_eq!(service.read_label(&reader, &[0u8; 16], ticket).await, None);
    }
}
