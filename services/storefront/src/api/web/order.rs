use axum::debug_handler;
use axum::extract::{
    Json as ExtractJson, Path as ExtractPath, Query as ExtractQuery, State as ExtractState,
};
use axum::http::{HeaderMap as HttpHeaderMap, StatusCode as HttpStatusCode};

use storefront_common::logging::{app_log_event, AppLogLevel};

use crate::api::web::dto::{OrderCreateReqData, OrderListQueryDto, OrderStatusReqDto};
use crate::repository::{app_repo_catalog, app_repo_order};
use crate::usecase::{
    ListOrdersUsKsResult, ListOrdersUseCase, OrderNotifyLinkUseCase, OrderNotifyUsKsResult,
    PlaceOrderUsKsErr, PlaceOrderUseCase, RetrieveOrderUsKsResult, RetrieveOrderUseCase,
    UpdateOrderStatusUsKsResult, UpdateOrderStatusUseCase,
};
use crate::AppSharedState;

use super::{json_resp_header, reason_resp, serialize_resp, RESP_INTERNAL_ERROR};

// always to specify state type explicitly to the debug macro
#[debug_handler(state=AppSharedState)]
pub(super) async fn create_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderCreateReqData>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let results = (app_repo_order(ds.clone()).await, app_repo_catalog(ds).await);
    let (status_code, resp_body) = match results {
        (Ok(repo_order), Ok(repo_catalog)) => {
            let uc = PlaceOrderUseCase {
                repo_order,
                repo_catalog,
                logctx: logctx.clone(),
                notify_phone: appstate.notify_phone(),
            };
            match uc.execute(req_body).await {
                Ok(value) => serialize_resp(HttpStatusCode::CREATED, &value),
                Err(PlaceOrderUsKsErr::ReqContent(value)) => {
                    serialize_resp(HttpStatusCode::BAD_REQUEST, &value)
                }
                Err(PlaceOrderUsKsErr::CreationFailed(_e)) => (
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    RESP_INTERNAL_ERROR.to_string(),
                ),
            }
        }
        (r0, r1) => {
            let errmsgs = [r0.err(), r1.err()]
                .into_iter()
                .flatten()
                .map(|e| e.to_string())
                .collect::<Vec<_>>();
            app_log_event!(logctx, AppLogLevel::ERROR, "repository init failure, {:?}", errmsgs);
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                RESP_INTERNAL_ERROR.to_string(),
            )
        }
    };
    (status_code, json_resp_header(), resp_body)
} // end of fn create_handler

#[debug_handler(state=AppSharedState)]
pub(super) async fn retrieve_handler(
    ExtractPath(oid): ExtractPath<u32>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_order(appstate.datastore()).await {
        Ok(repo) => {
            let uc = RetrieveOrderUseCase { repo, logctx };
            match uc.execute(oid).await {
                RetrieveOrderUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                RetrieveOrderUsKsResult::NotFound => {
                    reason_resp(HttpStatusCode::NOT_FOUND, "order-not-found")
                }
                RetrieveOrderUsKsResult::Server(_e) => (
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
pub(super) async fn list_handler(
    ExtractQuery(query): ExtractQuery<OrderListQueryDto>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_order(appstate.datastore()).await {
        Ok(repo) => {
            let uc = ListOrdersUseCase { repo, logctx };
            match uc.execute(query.status).await {
                ListOrdersUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                ListOrdersUsKsResult::InvalidStatus(_s) => {
                    reason_resp(HttpStatusCode::BAD_REQUEST, "invalid-status")
                }
                ListOrdersUsKsResult::Server(_e) => (
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
pub(super) async fn update_status_handler(
    ExtractPath(oid): ExtractPath<u32>,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderStatusReqDto>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let (status_code, resp_body) = match app_repo_order(appstate.datastore()).await {
        Ok(repo) => {
            let uc = UpdateOrderStatusUseCase { repo, logctx };
            match uc.execute(oid, req_body).await {
                UpdateOrderStatusUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                UpdateOrderStatusUsKsResult::InvalidStatus(_s) => {
                    reason_resp(HttpStatusCode::BAD_REQUEST, "invalid-status")
                }
                UpdateOrderStatusUsKsResult::InvalidTransition(_s) => {
                    reason_resp(HttpStatusCode::CONFLICT, "invalid-transition")
                }
                UpdateOrderStatusUsKsResult::NotFound => {
                    reason_resp(HttpStatusCode::NOT_FOUND, "order-not-found")
                }
                UpdateOrderStatusUsKsResult::Server(_e) => (
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
} // end of fn update_status_handler

#[debug_handler(state=AppSharedState)]
pub(super) async fn notify_link_handler(
    ExtractPath(oid): ExtractPath<u32>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> (HttpStatusCode, HttpHeaderMap, String) {
    let logctx = appstate.log_context().clone();
    let shop_phone = appstate.config().api_server.shop.whatsapp_phone.clone();
    let (status_code, resp_body) = match app_repo_order(appstate.datastore()).await {
        Ok(repo) => {
            let uc = OrderNotifyLinkUseCase {
                repo,
                logctx,
                shop_phone,
            };
            match uc.execute(oid).await {
                OrderNotifyUsKsResult::Success(v) => serialize_resp(HttpStatusCode::OK, &v),
                OrderNotifyUsKsResult::NotFound => {
                    reason_resp(HttpStatusCode::NOT_FOUND, "order-not-found")
                }
                OrderNotifyUsKsResult::Server(_e) => (
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
