use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use chrono::Local;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::api::web::dto::{
    FieldErrorReason, OrderCreateReqData, OrderCreateRespErrorDto, OrderCreateRespOkDto,
    OrderLineErrorDto, OrderLinesErrorDto,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{NotifyLinkModel, OrderCreateModel, PayMethodModel, ProductModel};
use crate::repository::{AbsCatalogRepo, AbsOrderRepo};

use super::phone_log_hint;

pub enum PlaceOrderUsKsErr {
    ReqContent(OrderCreateRespErrorDto),
    CreationFailed(AppError),
}

pub struct PlaceOrderUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub repo_catalog: Box<dyn AbsCatalogRepo>,
    pub logctx: Arc<AppLogContext>,
    // establishment phone, no notification link is composed if absent
    pub notify_phone: Option<String>,
}

impl PlaceOrderUseCase {
    pub async fn execute(
        self,
        req: OrderCreateReqData,
    ) -> DefaultResult<OrderCreateRespOkDto, PlaceOrderUsKsErr> {
        let Self {
            repo_order,
            repo_catalog,
            logctx,
            notify_phone,
        } = self;
        let model = OrderCreateModel::try_from(req).map_err(PlaceOrderUsKsErr::ReqContent)?;
        Self::check_catalog(repo_catalog.as_ref(), &model)
            .await
            .map_err(|e| match e {
                PlaceOrderUsKsErr::CreationFailed(e) => {
                    app_log_event!(logctx, AppLogLevel::ERROR, "catalog-lookup, {}", e);
                    PlaceOrderUsKsErr::CreationFailed(Self::wrap_error(e))
                }
                others => others,
            })?;
        if let Some((given, computed)) = model.client_total_mismatch() {
            app_log_event!(
                logctx,
                AppLogLevel::WARNING,
                "subtotal-mismatch, given:{}, computed:{}",
                given,
                computed
            );
        }
        let phone_hint = phone_log_hint(model.customer.phone.as_str());
        let num_lines = model.lines.len();
        let time = Local::now().fixed_offset();
        let oid = repo_order.create(model, time).await.map_err(|e| {
            app_log_event!(
                logctx,
                AppLogLevel::ERROR,
                "create, phone:{}, num_lines:{}, {}",
                phone_hint,
                num_lines,
                e
            );
            PlaceOrderUsKsErr::CreationFailed(Self::wrap_error(e))
        })?;
        let order = match repo_order.fetch(oid).await {
            Ok(Some(o)) => o,
            Ok(None) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "saved-order-missing, oid:{}", oid);
                let e = AppError {
                    code: AppErrorCode::OrderNotExist,
                    detail: Some(format!("oid:{oid}")),
                };
                return Err(PlaceOrderUsKsErr::CreationFailed(Self::wrap_error(e)));
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "fetch, oid:{}, {}", oid, e);
                return Err(PlaceOrderUsKsErr::CreationFailed(Self::wrap_error(e)));
            }
        };
        app_log_event!(
            logctx,
            AppLogLevel::INFO,
            "order-placed, oid:{}, phone:{}, total:{}",
            oid,
            phone_hint,
            order.total()
        );
        let whatsapp = notify_phone.map(|p| NotifyLinkModel::compose(p.as_str(), &order).into());
        Ok(OrderCreateRespOkDto {
            success: true,
            pedido: order.into(),
            whatsapp,
        })
    } // end of fn execute

    fn wrap_error(cause: AppError) -> AppError {
        AppError {
            code: AppErrorCode::OrderCreationFailed,
            detail: Some(cause.to_string()),
        }
    }

    // products and payment method have to exist and be active in catalog
    async fn check_catalog(
        repo: &dyn AbsCatalogRepo,
        model: &OrderCreateModel,
    ) -> DefaultResult<(), PlaceOrderUsKsErr> {
        let products = repo
            .fetch_products(Some(model.product_ids()))
            .await
            .map_err(PlaceOrderUsKsErr::CreationFailed)?;
        let pay_methods = repo
            .fetch_pay_methods()
            .await
            .map_err(PlaceOrderUsKsErr::CreationFailed)?;
        let mut err_obj = OrderCreateRespErrorDto::default();
        let line_errors = Self::check_products(products, model);
        if !line_errors.is_empty() {
            err_obj.itens = Some(OrderLinesErrorDto {
                geral: None,
                linhas: line_errors,
            });
        }
        err_obj.metodo_pagamento = Self::check_pay_method(pay_methods, model.pay_method.as_str());
        if err_obj.itens.is_none() && err_obj.metodo_pagamento.is_none() {
            Ok(())
        } else {
            Err(PlaceOrderUsKsErr::ReqContent(err_obj))
        }
    }

    fn check_products(products: Vec<ProductModel>, model: &OrderCreateModel) -> Vec<OrderLineErrorDto> {
        let found = products
            .into_iter()
            .map(|p| (p.id, p.active))
            .collect::<HashMap<u32, bool>>();
        model
            .lines
            .iter()
            .filter_map(|l| {
                let reason = match found.get(&l.product_id) {
                    None => FieldErrorReason::NotExist,
                    Some(false) => FieldErrorReason::Inactive,
                    Some(true) => return None,
                };
                Some(OrderLineErrorDto {
                    produto_id: l.product_id,
                    produto: Some(reason),
                    quantidade: None,
                    preco_unitario: None,
                })
            })
            .collect()
    }

    fn check_pay_method(methods: Vec<PayMethodModel>, given: &str) -> Option<FieldErrorReason> {
        let mut matched = methods.into_iter().filter(|m| m.value == given).peekable();
        if matched.peek().is_none() {
            Some(FieldErrorReason::NotExist)
        } else if matched.any(|m| m.active) {
            None
        } else {
            Some(FieldErrorReason::Inactive)
        }
    }
} // end of impl PlaceOrderUseCase
