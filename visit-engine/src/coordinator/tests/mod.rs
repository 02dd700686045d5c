use super::*;
use crate::collection::line_from_input;
use crate::traits::ServiceCatalog;
use async_trait::async_trait;
use shared::error::PersistenceError;
use shared::visit::CatalogEntry;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("visit_engine=debug")
        .with_test_writer()
        .try_init();
}

// ========================================================================
// Mock collaborators
// ========================================================================

/// In-memory persistence collaborator with programmable failures and an
/// optional block gate to hold a submission in flight.
#[derive(Default)]
struct MockPersistence {
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_with: Mutex<Option<PersistenceError>>,
    block_on: Mutex<Option<Arc<Notify>>>,
    store: Mutex<Vec<ServiceLineItem>>,
}

impl MockPersistence {
    fn with_store(items: Vec<ServiceLineItem>) -> Self {
        Self {
            store: Mutex::new(items),
            ..Default::default()
        }
    }

    fn fail_next_with(&self, err: PersistenceError) {
        *self.fail_with.lock() = Some(err);
    }

    /// Make the next call wait until the returned Notify is triggered
    fn block_next(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.block_on.lock() = Some(notify.clone());
        notify
    }

    async fn gate(&self) -> Result<(), PersistenceError> {
        let block = self.block_on.lock().take();
        if let Some(notify) = block {
            notify.notified().await;
        }
        if let Some(err) = self.fail_with.lock().take() {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl VisitPersistence for MockPersistence {
    async fn add_services(
        &self,
        _visit_id: &str,
        inputs: &[ServiceLineInput],
    ) -> Result<Vec<ServiceLineItem>, PersistenceError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        let mut store = self.store.lock();
        for input in inputs {
            store.push(line_from_input(input));
        }
        Ok(store.clone())
    }

    async fn remove_service(
        &self,
        _visit_id: &str,
        service_id: &str,
        _reason: Option<&str>,
    ) -> Result<Vec<ServiceLineItem>, PersistenceError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        let mut store = self.store.lock();
        if !store.iter().any(|i| i.id == service_id) {
            return Err(PersistenceError::Conflict(format!(
                "service already removed: {service_id}"
            )));
        }
        store.retain(|i| i.id != service_id);
        Ok(store.clone())
    }

    async fn update_prices(
        &self,
        _visit_id: &str,
        items: &[ServiceLineItem],
    ) -> Result<(), PersistenceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        *self.store.lock() = items.to_vec();
        Ok(())
    }
}

/// Settable status source
struct MockStatusSource {
    status: Mutex<VisitStatus>,
}

impl MockStatusSource {
    fn new(status: VisitStatus) -> Self {
        Self {
            status: Mutex::new(status),
        }
    }

    fn set(&self, status: VisitStatus) {
        *self.status.lock() = status;
    }
}

#[async_trait]
impl VisitStatusSource for MockStatusSource {
    async fn get_status(&self, _visit_id: &str) -> Result<VisitStatus, PersistenceError> {
        Ok(*self.status.lock())
    }
}

/// Fixed-inventory catalog
struct MockCatalog {
    entries: Vec<CatalogEntry>,
}

#[async_trait]
impl ServiceCatalog for MockCatalog {
    async fn list_available_services(&self) -> Result<Vec<CatalogEntry>, PersistenceError> {
        Ok(self.entries.clone())
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn price(gross: f64) -> Money {
    Money::from_gross(gross, 21.0)
}

fn input(id: &str, name: &str, gross: f64) -> ServiceLineInput {
    ServiceLineInput {
        id: id.to_string(),
        name: name.to_string(),
        base_price: price(gross),
        quantity: 1,
        discount_mode: None,
        discount_value: None,
        note: None,
    }
}

/// Build a coordinator whose local items and the mock store agree
fn seeded_coordinator(
    status: VisitStatus,
    seed: &[(&str, f64)],
) -> (
    Arc<MutationCoordinator>,
    Arc<MockPersistence>,
    Arc<MockStatusSource>,
) {
    let items: Vec<ServiceLineItem> = seed
        .iter()
        .map(|(id, gross)| line_from_input(&input(id, &format!("Service {id}"), *gross)))
        .collect();
    let persistence = Arc::new(MockPersistence::with_store(items.clone()));
    let status_source = Arc::new(MockStatusSource::new(status));
    let coordinator = Arc::new(MutationCoordinator::new(
        "visit-1",
        status,
        items,
        persistence.clone(),
        status_source.clone(),
    ));
    (coordinator, persistence, status_source)
}

mod test_core;
