use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::{AppError, AppErrorCode};
use crate::model::{
    BannerModel, CatalogEditCommand, CatalogItemKind, CatalogItemModel, CategoryModel,
    CustomerModel, NeighborhoodModel, OrderCreateModel, OrderModel, OrderStatus, PayMethodModel,
    ProductModel,
};
use crate::AppDataStoreContext;

mod in_mem;
// make in-memory repo visible only for testing purpose
pub use in_mem::catalog::CatalogInMemRepo;
pub use in_mem::order::OrderInMemRepo;

#[cfg(feature = "mariadb")]
mod mariadb;

#[cfg(feature = "mariadb")]
use mariadb::catalog::CatalogMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::order::OrderMariaDbRepo;

pub type AppOrderRepoUpdateStatusUserFunc =
    fn(&mut OrderStatus, OrderStatus) -> DefaultResult<(), AppError>;

// the repository instance may be used across an await, the future created by
// app callers has to be able to pass to different threads, it is the reason
// to add `Send` and `Sync` as super-traits
#[async_trait]
pub trait AbsOrderRepo: Sync + Send {
    async fn find_customer_by_phone(
        &self,
        phone: &str,
    ) -> DefaultResult<Option<CustomerModel>, AppError>;

    /// Upsert the customer by phone, then write the order and all its lines,
    /// as one atomic unit. Returns identifier of the new order.
    async fn create(
        &self,
        req: OrderCreateModel,
        time: DateTime<FixedOffset>,
    ) -> DefaultResult<u32, AppError>;

    async fn fetch(&self, oid: u32) -> DefaultResult<Option<OrderModel>, AppError>;

    // newest first
    async fn fetch_by_status(
        &self,
        status: Option<OrderStatus>,
    ) -> DefaultResult<Vec<OrderModel>, AppError>;

    /// `usr_cb` decides whether the transition from the stored status is
    /// allowed, the order is re-fetched after the change is saved. `None` if
    /// the order does not exist.
    async fn update_status(
        &self,
        oid: u32,
        new_status: OrderStatus,
        usr_cb: AppOrderRepoUpdateStatusUserFunc,
    ) -> DefaultResult<Option<OrderModel>, AppError>;
}

#[async_trait]
pub trait AbsCatalogRepo: Sync + Send {
    async fn fetch_categories(&self) -> DefaultResult<Vec<CategoryModel>, AppError>;
    async fn fetch_products(
        &self,
        ids: Option<Vec<u32>>,
    ) -> DefaultResult<Vec<ProductModel>, AppError>;
    async fn fetch_neighborhoods(&self) -> DefaultResult<Vec<NeighborhoodModel>, AppError>;
    async fn fetch_pay_methods(&self) -> DefaultResult<Vec<PayMethodModel>, AppError>;
    async fn fetch_banners(&self) -> DefaultResult<Vec<BannerModel>, AppError>;
    /// `None` if no entry of the given kind has the identifier
    async fn fetch_item(
        &self,
        kind: CatalogItemKind,
        id: u32,
    ) -> DefaultResult<Option<CatalogItemModel>, AppError>;
    /// returns identifier of the created / modified / deleted item, error
    /// code `CatalogItemNotExist` for unknown id
    async fn apply(&self, cmd: CatalogEditCommand) -> DefaultResult<u32, AppError>;
}

pub async fn app_repo_order(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsOrderRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = OrderMariaDbRepo::new(dbs)?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = OrderInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("in-memory".to_string()),
        })
    }
}

pub async fn app_repo_catalog(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsCatalogRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = CatalogMariaDbRepo::new(dbs)?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = CatalogInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("in-memory".to_string()),
        })
    }
}
