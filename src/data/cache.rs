//! Process-wide catalog cache keyed by source identity. Reads share one `Arc<Catalog>`;
//! admin writes drop the entry so the next read rebuilds it from the source.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::data::beer::Catalog;
use crate::data::source::{BeerSource, SourceError};

#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: RwLock<HashMap<String, Arc<Catalog>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, source: &dyn BeerSource) -> Result<Arc<Catalog>, SourceError> {
        let identity = source.identity();
        if let Some(hit) = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&identity).cloned())
        {
            debug!(source = %identity, "catalog cache hit");
            return Ok(hit);
        }

        let catalog = Arc::new(load_catalog(source)?);
        if let Ok(mut entries) = self.entries.write() {
            // another session may have loaded it meanwhile; keep whichever landed first
            let entry = entries
                .entry(identity)
                .or_insert_with(|| Arc::clone(&catalog));
            return Ok(Arc::clone(entry));
        }
        Ok(catalog)
    }

    pub fn invalidate(&self, identity: &str) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.remove(identity).is_some() {
                info!(source = %identity, "catalog cache invalidated");
            }
        }
    }

    pub fn is_cached(&self, identity: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(identity))
            .unwrap_or(false)
    }
}

/// Read the source and derive every computed column.
pub fn load_catalog(source: &dyn BeerSource) -> Result<Catalog, SourceError> {
    let identity = source.identity();
    let table = source.load()?;
    let catalog = Catalog::from_table(identity.clone(), &table);
    info!(source = %identity, beers = catalog.beers.len(), "catalog loaded");
    Ok(catalog)
}
