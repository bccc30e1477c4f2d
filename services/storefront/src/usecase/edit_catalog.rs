use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::api::web::dto::{
    CatalogEditErrorDto, CatalogEditReqDto, CatalogEditRespDto, CatalogEntityDto, CatalogItemDto,
    CatalogQueryDto, CatalogRespDto, FieldErrorReason,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{CatalogEditCommand, CatalogItemKind, CatalogModelSet, NeighborhoodModelSet};
use crate::repository::AbsCatalogRepo;

pub enum EditCatalogUsKsResult {
    Success(CatalogEditRespDto),
    ReqContent(CatalogEditErrorDto),
    NotFound,
    Server(AppError),
}

pub enum RetrieveCatalogItemUsKsResult {
    Success(CatalogItemDto),
    NotFound,
    Server(AppError),
}

pub struct ListCatalogUseCase {
    pub repo: Box<dyn AbsCatalogRepo>,
    pub logctx: Arc<AppLogContext>,
}

pub struct EditCatalogUseCase {
    pub repo: Box<dyn AbsCatalogRepo>,
    pub logctx: Arc<AppLogContext>,
}

pub struct RetrieveCatalogItemUseCase {
    pub repo: Box<dyn AbsCatalogRepo>,
    pub logctx: Arc<AppLogContext>,
}

impl ListCatalogUseCase {
    pub async fn execute(self, query: CatalogQueryDto) -> DefaultResult<CatalogRespDto, AppError> {
        let Self { repo, logctx } = self;
        let result = Self::load(repo.as_ref()).await;
        let set = result.map_err(|e| {
            app_log_event!(logctx, AppLogLevel::ERROR, "{}", e);
            e
        })?;
        let visible = set.visible(query.inativos, query.categoria_id);
        Ok(visible.into())
    }

    async fn load(repo: &dyn AbsCatalogRepo) -> DefaultResult<CatalogModelSet, AppError> {
        Ok(CatalogModelSet {
            categories: repo.fetch_categories().await?,
            products: repo.fetch_products(None).await?,
            neighborhoods: NeighborhoodModelSet(repo.fetch_neighborhoods().await?),
            pay_methods: repo.fetch_pay_methods().await?,
            banners: repo.fetch_banners().await?,
        })
    }
}

impl RetrieveCatalogItemUseCase {
    pub async fn execute(self, entity: CatalogEntityDto, id: u32) -> RetrieveCatalogItemUsKsResult {
        let Self { repo, logctx } = self;
        let kind = CatalogItemKind::from(entity);
        match repo.fetch_item(kind, id).await {
            Ok(Some(item)) => RetrieveCatalogItemUsKsResult::Success(item.into()),
            Ok(None) => RetrieveCatalogItemUsKsResult::NotFound,
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "{:?}:{}, {}", kind, id, e);
                RetrieveCatalogItemUsKsResult::Server(e)
            }
        }
    }
}

impl EditCatalogUseCase {
    pub async fn execute(self, req: CatalogEditReqDto) -> EditCatalogUsKsResult {
        let Self { repo, logctx } = self;
        let cmd = match CatalogEditCommand::try_from(req) {
            Ok(c) => c,
            Err(e) => return EditCatalogUsKsResult::ReqContent(e),
        };
        if let Err(e) = Self::check_category(repo.as_ref(), &cmd).await {
            return e;
        }
        match repo.apply(cmd.clone()).await {
            Ok(id) => {
                app_log_event!(logctx, AppLogLevel::INFO, "id:{}, cmd:{:?}", id, cmd);
                EditCatalogUsKsResult::Success(CatalogEditRespDto { success: true, id })
            }
            Err(e) if e.code == AppErrorCode::CatalogItemNotExist => {
                app_log_event!(logctx, AppLogLevel::WARNING, "{}", e);
                EditCatalogUsKsResult::NotFound
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "{}", e);
                EditCatalogUsKsResult::Server(e)
            }
        }
    } // end of fn execute

    // product referring to unknown category is a client error, not a missing target
    async fn check_category(
        repo: &dyn AbsCatalogRepo,
        cmd: &CatalogEditCommand,
    ) -> DefaultResult<(), EditCatalogUsKsResult> {
        let category_id = match cmd {
            CatalogEditCommand::CreateProduct(m) | CatalogEditCommand::UpdateProduct(_, m) => {
                m.category_id
            }
            _others => None,
        };
        let cid = match category_id {
            Some(v) => v,
            None => return Ok(()),
        };
        let categories = repo
            .fetch_categories()
            .await
            .map_err(EditCatalogUsKsResult::Server)?;
        if categories.iter().any(|c| c.id == cid) {
            Ok(())
        } else {
            Err(EditCatalogUsKsResult::ReqContent(CatalogEditErrorDto {
                campo: "categoria_id".to_string(),
                motivo: FieldErrorReason::NotExist,
            }))
        }
    }
} // end of impl EditCatalogUseCase
