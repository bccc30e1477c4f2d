use axum::debug_handler;
use axum::extract::{
    Json as ExtractJson, Path as ExtractPath, Query as ExtractQuery, State as ExtractState,
};
use axum::http::{HeaderMap as HttpHeaderMap, StatusCode as HttpStatusCode};

use storefront_common::logging::{app_log_event, AppLogLevel};

use crate::api::web::dto::{CatalogEditReqDto, CatalogEntityDto, CatalogQueryDto};
use crate::repository::app_repo_catalog;
use crate::usecase::{
    EditCatalogUsKsResult, EditCatalogUseCase, ListCatalogUseCase, RetrieveCatalogItemUsKsResult,
    RetrieveCatalogItemUseCase,
};
use crate::AppSharedState;

use super::{json_resp_header, reason_resp, serialize_resp, RESP_INTERNAL_ERROR};

#[debug_handler(state=AppSharedState)]
pub(super) async fn list_handler(
    ExtractQuery(query): ExtractQuery<CatalogQueryDto>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_catalog(appstate.datastore()).await {
        Ok(repo) => {
            let uc = ListCatalogUseCase { repo, logctx };
            match uc.execute(query).await {
                Ok(v) => serialize_resp(HttpStatusCode::OK, &v),
                Err(_e) => (
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    RESP_INTERNAL_ERROR.to_string(),
                ),
            }
        }
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repository init failure, {}", e);
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                RESP_INTERNAL_ERROR.to_string(),
            )
        }
    };
    (status_code, json_resp_header(), resp_body)
}

#[debug_handler(state=AppSharedState)]
pub(super) async fn retrieve_item_handler(
    ExtractPath((entity, id)): ExtractPath<(CatalogEntityDto, u32)>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_catalog(appstate.datastore()).await {
        Ok(repo) => {
            let uc = RetrieveCatalogItemUseCase { repo, logctx };
            match uc.execute(entity, id).await {
                RetrieveCatalogItemUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                RetrieveCatalogItemUsKsResult::NotFound => {
                    reason_resp(HttpStatusCode::NOT_FOUND, "item-not-found")
                }
                RetrieveCatalogItemUsKsResult::Server(_e) => (
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    RESP_INTERNAL_ERROR.to_string(),
                ),
            }
        }
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repository init failure, {}", e);
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                RESP_INTERNAL_ERROR.to_string(),
            )
        }
    };
    (status_code, json_resp_header(), resp_body)
}

#[debug_handler(state=AppSharedState)]
pub(super) async fn edit_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<CatalogEditReqDto>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_catalog(appstate.datastore()).await {
        Ok(repo) => {
            let uc = EditCatalogUseCase { repo, logctx };
            match uc.execute(req_body).await {
                EditCatalogUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                EditCatalogUsKsResult::ReqContent(v) => {
                    serialize_resp(HttpStatusCode::BAD_REQUEST, &v)
                }
                EditCatalogUsKsResult::NotFound => {
                    reason_resp(HttpStatusCode::NOT_FOUND, "item-not-found")
                }
                EditCatalogUsKsResult::Server(_e) => (
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    RESP_INTERNAL_ERROR.to_string(),
                ),
            }
        }
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repository init failure, {}", e);
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                RESP_INTERNAL_ERROR.to_string(),
            )
        }
    };
    (status_code, json_resp_header(), resp_body)
}
