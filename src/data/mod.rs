pub mod cache;
pub mod chains;
pub mod classifier;
pub mod explorer;
pub mod export;
pub mod labels;
pub mod provider;
pub mod report;
pub mod resolver;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::B256;
use tokio::sync::RwLock;
use tokio::sync::mpsc;

use crate::data::cache::DataCache;
use crate::data::report::{ActivityReport, TxRecord};
use crate::data::resolver::Resolver;
use crate::data::types::{ResolutionResult, TransactionDetail};
use crate::events::AppEvent;

/// Runs resolver requests and exports off the UI loop and reports back
/// through `AppEvent`s.
pub struct DataService {
    resolver: Arc<Resolver>,
    cache: Arc<RwLock<DataCache>>,
    export_dir: PathBuf,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl DataService {
    pub fn new(
        resolver: Resolver,
        export_dir: PathBuf,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache: Arc::new(RwLock::new(DataCache::new())),
            export_dir,
            event_tx,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Look up a single transaction by hash.
    pub fn fetch_transaction(&self, hash: B256, chain: Option<String>) {
        let resolver = Arc::clone(&self.resolver);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            {
                let mut c = cache.write().await;
                if let Some(cached) = c.get_transaction(hash, chain.as_deref()) {
                    let _ = tx.send(AppEvent::TransactionLoaded(Box::new(cached)));
                    return;
                }
            }

            match resolver.lookup(&format!("{hash:#x}"), chain.as_deref()).await {
                Ok(detail) => {
                    cache
                        .write()
                        .await
                        .put_transaction(hash, chain.as_deref(), detail.clone());
                    let _ = tx.send(AppEvent::TransactionLoaded(Box::new(detail)));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::LookupFailed(e));
                }
            }
        });
    }

    /// Resolve recent activity of the wallet that sent `hash`.
    pub fn fetch_activity(&self, hash: B256, chain: Option<String>) {
        let resolver = Arc::clone(&self.resolver);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            {
                let mut c = cache.write().await;
                if let Some(cached) = c.get_activity(hash, chain.as_deref()) {
                    let _ = tx.send(AppEvent::ActivityLoaded(Box::new(cached)));
                    return;
                }
            }

            match resolver.resolve(&format!("{hash:#x}"), chain.as_deref()).await {
                Ok(result) => {
                    cache
                        .write()
                        .await
                        .put_activity(hash, chain.as_deref(), result.clone());
                    let _ = tx.send(AppEvent::ActivityLoaded(Box::new(result)));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::LookupFailed(e));
                }
            }
        });
    }

    pub fn export_pdf(&self, detail: TransactionDetail) {
        let path = self.export_dir.join(export::default_pdf_name(&detail.tx.hash));
        self.spawn_export(move || export::export_tx_pdf(&TxRecord::from_detail(&detail), &path));
    }

    pub fn export_csv(&self, result: ResolutionResult) {
        let path = self
            .export_dir
            .join(format!("activity_{}.csv", short_hash(&result.seed_hash)));
        self.spawn_export(move || export::export_activity_csv(&result, &path));
    }

    pub fn export_json(&self, result: ResolutionResult) {
        let path = self
            .export_dir
            .join(format!("activity_{}.json", short_hash(&result.seed_hash)));
        self.spawn_export(move || {
            export::export_activity_json(&ActivityReport::from_result(&result), &path)
        });
    }

    fn spawn_export<F>(&self, write: F)
    where
        F: FnOnce() -> Result<String, crate::error::ExportError> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        tokio::task::spawn_blocking(move || {
            let event = match write() {
                Ok(message) => {
                    tracing::info!("{message}");
                    AppEvent::ExportComplete(message)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    AppEvent::Error(format!("Export failed: {e}"))
                }
            };
            let _ = tx.send(event);
        });
    }
}

fn short_hash(hash: &B256) -> String {
    format!("{hash:#x}")[..10].to_string()
}
