use std::boxed::Box;
use std::sync::Arc;

pub mod api;
pub mod constant;
pub mod error;
pub mod model;
pub mod network;
pub mod repository;
pub mod usecase;

mod adapter;
pub use adapter::datastore;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppConfig;
use storefront_common::logging::AppLogContext;

type WebApiHdlrLabel = &'static str;

pub struct AppDataStoreContext {
    pub in_mem: Option<Arc<Box<dyn datastore::AbstInMemoryDStore>>>,
    pub sql_dbs: Option<Vec<Arc<datastore::AppMariaDbStore>>>,
}

// global state shared by all threads
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<AppLogContext>,
    dstore: Arc<AppDataStoreContext>,
}

impl AppSharedState {
    pub fn new(
        cfg: AppConfig,
        log: AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> Self {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let (in_mem, sql_dbs) =
            datastore::build_context(log.clone(), &cfg.api_server.data_store, confidential);
        let in_mem = in_mem.map(Arc::new);
        let sql_dbs = sql_dbs.map(|m| m.into_iter().map(Arc::new).collect());
        let ds_ctx = Arc::new(AppDataStoreContext { in_mem, sql_dbs });
        Self {
            _cfg: Arc::new(cfg),
            _log: log,
            dstore: ds_ctx,
        }
    } // end of fn new

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }

    pub fn log_context(&self) -> &Arc<AppLogContext> {
        &self._log
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self.dstore.clone()
    }

    /// phone number of the establishment, present only when new orders
    /// should come with a notification link
    pub fn notify_phone(&self) -> Option<String> {
        let shop = &self._cfg.api_server.shop;
        if shop.notify_by_whatsapp {
            Some(shop.whatsapp_phone.clone())
        } else {
            None
        }
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            dstore: self.dstore.clone(),
        }
    }
}
