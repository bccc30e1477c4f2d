use std::boxed::Box;
use std::str::FromStr;
use std::sync::Arc;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::api::web::dto::{OrderDto, OrderNotifyRespDto, OrderStatusReqDto};
use crate::error::{AppError, AppErrorCode};
use crate::model::{NotifyLinkModel, OrderStatus};
use crate::repository::AbsOrderRepo;

pub enum RetrieveOrderUsKsResult {
    Success(OrderDto),
    NotFound,
    Server(AppError),
}

pub enum ListOrdersUsKsResult {
    Success(Vec<OrderDto>),
    InvalidStatus(String),
    Server(AppError),
}

pub enum UpdateOrderStatusUsKsResult {
    Success(OrderDto),
    InvalidStatus(String),
    // requested status not reachable from the current one
    InvalidTransition(OrderStatus),
    NotFound,
    Server(AppError),
}

pub enum OrderNotifyUsKsResult {
    Success(OrderNotifyRespDto),
    NotFound,
    Server(AppError),
}

pub struct RetrieveOrderUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub logctx: Arc<AppLogContext>,
}
pub struct ListOrdersUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub logctx: Arc<AppLogContext>,
}
pub struct UpdateOrderStatusUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub logctx: Arc<AppLogContext>,
}
pub struct OrderNotifyLinkUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub logctx: Arc<AppLogContext>,
    pub shop_phone: String,
}

impl RetrieveOrderUseCase {
    pub async fn execute(self, oid: u32) -> RetrieveOrderUsKsResult {
        let logctx = self.logctx;
        match self.repo.fetch(oid).await {
            Ok(Some(o)) => RetrieveOrderUsKsResult::Success(o.into()),
            Ok(None) => RetrieveOrderUsKsResult::NotFound,
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "oid:{}, {}", oid, e);
                RetrieveOrderUsKsResult::Server(e)
            }
        }
    }
}

impl ListOrdersUseCase {
    pub async fn execute(self, status: Option<String>) -> ListOrdersUsKsResult {
        let logctx = self.logctx;
        let status = match status.as_deref().map(OrderStatus::from_str).transpose() {
            Ok(s) => s,
            Err(_e) => return ListOrdersUsKsResult::InvalidStatus(status.unwrap_or_default()),
        };
        match self.repo.fetch_by_status(status).await {
            Ok(orders) => {
                let out = orders.into_iter().map(OrderDto::from).collect();
                ListOrdersUsKsResult::Success(out)
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "status:{:?}, {}", status, e);
                ListOrdersUsKsResult::Server(e)
            }
        }
    }
}

impl UpdateOrderStatusUseCase {
    pub async fn execute(self, oid: u32, req: OrderStatusReqDto) -> UpdateOrderStatusUsKsResult {
        let Self { repo, logctx } = self;
        let new_status = match OrderStatus::from_str(req.status.as_str()) {
            Ok(s) => s,
            Err(_e) => return UpdateOrderStatusUsKsResult::InvalidStatus(req.status),
        };
        // the repository keeps the order locked while the callback decides
        match repo.update_status(oid, new_status, OrderStatus::transit).await {
            Ok(Some(o)) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::INFO,
                    "oid:{}, status:{}",
                    oid,
                    new_status.label()
                );
                UpdateOrderStatusUsKsResult::Success(o.into())
            }
            Ok(None) => UpdateOrderStatusUsKsResult::NotFound,
            Err(e) if e.code == AppErrorCode::InvalidOrderStatus => {
                app_log_event!(logctx, AppLogLevel::WARNING, "oid:{}, {}", oid, e);
                UpdateOrderStatusUsKsResult::InvalidTransition(new_status)
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "oid:{}, {}", oid, e);
                UpdateOrderStatusUsKsResult::Server(e)
            }
        }
    } // end of fn execute
}

impl OrderNotifyLinkUseCase {
    pub async fn execute(self, oid: u32) -> OrderNotifyUsKsResult {
        let Self {
            repo,
            logctx,
            shop_phone,
        } = self;
        match repo.fetch(oid).await {
            Ok(Some(o)) => {
                let link = NotifyLinkModel::compose(shop_phone.as_str(), &o);
                OrderNotifyUsKsResult::Success(OrderNotifyRespDto {
                    success: true,
                    whatsapp: link.into(),
                })
            }
            Ok(None) => OrderNotifyUsKsResult::NotFound,
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "oid:{}, {}", oid, e);
                OrderNotifyUsKsResult::Server(e)
            }
        }
    }
}
