mod place_order;

use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use storefront::error::{AppError, AppErrorCode};
use storefront::model::{
    CatalogEditCommand, CategoryEditModel, CustomerModel, OrderCreateModel, OrderModel,
    OrderStatus, PayMethodEditModel, ProductEditModel,
};
use storefront::repository::{
    AbsCatalogRepo, AbsOrderRepo, AppOrderRepoUpdateStatusUserFunc, CatalogInMemRepo,
    OrderInMemRepo,
};
use storefront::AppDataStoreContext;

use crate::in_mem_ds_ctx_setup;

// order repository whose results are decided by test cases
pub(crate) struct MockOrderRepo {
    pub(crate) create_result: DefaultResult<u32, AppError>,
    pub(crate) fetch_result: DefaultResult<Option<OrderModel>, AppError>,
}

#[async_trait]
impl AbsOrderRepo for MockOrderRepo {
    async fn find_customer_by_phone(
        &self,
        _phone: &str,
    ) -> DefaultResult<Option<CustomerModel>, AppError> {
        Ok(None)
    }
    async fn create(
        &self,
        _req: OrderCreateModel,
        _time: DateTime<FixedOffset>,
    ) -> DefaultResult<u32, AppError> {
        self.create_result.clone()
    }
    async fn fetch(&self, _oid: u32) -> DefaultResult<Option<OrderModel>, AppError> {
        self.fetch_result.clone()
    }
    async fn fetch_by_status(
        &self,
        _status: Option<OrderStatus>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        Err(AppError {
            code: AppErrorCode::RemoteDbServerFailure,
            detail: Some("utest".to_string()),
        })
    }
    async fn update_status(
        &self,
        _oid: u32,
        _new_status: OrderStatus,
        _usr_cb: AppOrderRepoUpdateStatusUserFunc,
    ) -> DefaultResult<Option<OrderModel>, AppError> {
        Err(AppError {
            code: AppErrorCode::DatabaseServerBusy,
            detail: Some("utest".to_string()),
        })
    }
}

pub(crate) struct UtestRepos {
    pub(crate) order: Box<dyn AbsOrderRepo>,
    pub(crate) catalog: Box<dyn AbsCatalogRepo>,
    pub(crate) products: [u32; 3],
    ds: Arc<AppDataStoreContext>,
}

impl UtestRepos {
    // another repository over the same tables, use cases consume the one they get
    pub(crate) async fn new_catalog_repo(&self) -> Box<dyn AbsCatalogRepo> {
        let m = self.ds.in_mem.clone().unwrap();
        Box::new(CatalogInMemRepo::new(m).await.unwrap())
    }
}

// products : burger 22.50, soda 6.00, and inactive dessert 9.90
pub(crate) async fn ut_setup_repos() -> UtestRepos {
    let ds = in_mem_ds_ctx_setup(100);
    let mem = ds.in_mem.clone().unwrap();
    let catalog = CatalogInMemRepo::new(mem.clone()).await.unwrap();
    let order = OrderInMemRepo::new(mem).await.unwrap();
    let cmd = CatalogEditCommand::CreateCategory(CategoryEditModel {
        name: "Lanches".to_string(),
        active: true,
    });
    let cid = catalog.apply(cmd).await.unwrap();
    let mut products = [0u32; 3];
    let items = [("X-Burger", 2250, true), ("Guarana 350ml", 600, true), ("Pudim", 990, false)];
    for (idx, (name, cents, active)) in items.into_iter().enumerate() {
        let cmd = CatalogEditCommand::CreateProduct(ProductEditModel {
            name: name.to_string(),
            description: None,
            price: Decimal::new(cents, 2),
            image_url: None,
            category_id: Some(cid),
            active,
        });
        products[idx] = catalog.apply(cmd).await.unwrap();
    }
    for (name, value, active) in [("Pix", "pix", true), ("Cheque", "cheque", false)] {
        let cmd = CatalogEditCommand::CreatePayMethod(PayMethodEditModel {
            name: name.to_string(),
            value: value.to_string(),
            active,
        });
        catalog.apply(cmd).await.unwrap();
    }
    UtestRepos {
        order: Box::new(order),
        catalog: Box::new(catalog),
        products,
        ds,
    }
} // end of fn ut_setup_repos
