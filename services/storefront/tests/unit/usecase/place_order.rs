use rust_decimal::Decimal;

use storefront::api::web::dto::{FieldErrorReason, OrderCreateReqData, OrderLineReqDto};
use storefront::constant::WHATSAPP_DEEPLINK_BASE;
use storefront::error::{AppError, AppErrorCode};
use storefront::model::{OrderDeliveryModel, OrderStatus};
use storefront::usecase::{PlaceOrderUsKsErr, PlaceOrderUseCase};

use super::{ut_setup_repos, MockOrderRepo, UtestRepos};
use crate::model::order::ut_order_req;
use crate::ut_log_context;

fn ut_req_with_lines(lines: &[(u32, i32, i64)]) -> OrderCreateReqData {
    let mut req = ut_order_req(true, Decimal::new(850, 2));
    req.itens = lines
        .iter()
        .map(|(pid, qty, cents)| OrderLineReqDto {
            produto_id: *pid,
            quantidade: *qty,
            preco_unitario: Decimal::new(*cents, 2),
        })
        .collect();
    req
}

#[tokio::test]
async fn place_order_ok() {
    let UtestRepos {
        order,
        catalog,
        products,
        ..
    } = ut_setup_repos().await;
    let mut req = ut_req_with_lines(&[(products[0], 2, 2250), (products[1], 1, 600)]);
    // totals computed by client are never trusted
    req.pedido.total = Some(Decimal::new(1, 2));
    let uc = PlaceOrderUseCase {
        repo_order: order,
        repo_catalog: catalog,
        logctx: ut_log_context(),
        notify_phone: Some("(11) 98765-4321".to_string()),
    };
    let resp = match uc.execute(req).await {
        Ok(v) => v,
        Err(_e) => panic!("expect order placed"),
    };
    assert!(resp.success);
    let saved = resp.pedido;
    assert_eq!(saved.status, OrderStatus::Pending);
    assert_eq!(saved.subtotal, Decimal::new(5100, 2));
    assert_eq!(saved.taxa_entrega, Decimal::new(850, 2));
    assert_eq!(saved.total, Decimal::new(5950, 2));
    assert_eq!(saved.cliente.nome.as_str(), "Joana Lima");
    assert_eq!(saved.itens.len(), 2);
    assert_eq!(saved.itens[0].produto_nome.as_str(), "X-Burger");
    let notify = resp.whatsapp.unwrap();
    let expect_prefix = format!("{WHATSAPP_DEEPLINK_BASE}?phone=11987654321&text=");
    assert!(notify.link.starts_with(expect_prefix.as_str()));
    let expect_title = format!("*NOVO PEDIDO #{}*", saved.id);
    assert!(notify.mensagem.starts_with(expect_title.as_str()));
} // end of fn place_order_ok

#[tokio::test]
async fn place_order_without_notify() {
    let repos = ut_setup_repos().await;
    let mut req = ut_req_with_lines(&[(repos.products[1], 3, 600)]);
    req.pedido.entrega = false;
    req.pedido.taxa_entrega = Decimal::ZERO;
    let uc = PlaceOrderUseCase {
        repo_order: repos.order,
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: None,
    };
    let resp = match uc.execute(req).await {
        Ok(v) => v,
        Err(_e) => panic!("expect order placed"),
    };
    assert!(resp.whatsapp.is_none());
    assert!(!resp.pedido.entrega);
    assert_eq!(resp.pedido.total, Decimal::new(1800, 2));
}

#[tokio::test]
async fn place_order_invalid_request() {
    let repos = ut_setup_repos().await;
    let mut req = ut_req_with_lines(&[(repos.products[0], 1, 2250)]);
    req.cliente.telefone = "".to_string();
    let uc = PlaceOrderUseCase {
        repo_order: repos.order,
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: None,
    };
    match uc.execute(req).await {
        Err(PlaceOrderUsKsErr::ReqContent(e)) => {
            let cust_e = e.cliente.unwrap();
            assert_eq!(cust_e.telefone, Some(FieldErrorReason::Empty));
        }
        _others => panic!("expect client error"),
    }
}

#[tokio::test]
async fn place_order_catalog_mismatch() {
    let repos = ut_setup_repos().await;
    let [burger, _soda, dessert] = repos.products;
    let mut req = ut_req_with_lines(&[(burger, 1, 2250), (dessert, 1, 990), (9999, 1, 100)]);
    req.pedido.metodo_pagamento = "cheque".to_string();
    let uc = PlaceOrderUseCase {
        repo_order: repos.order,
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: None,
    };
    match uc.execute(req).await {
        Err(PlaceOrderUsKsErr::ReqContent(e)) => {
            assert_eq!(e.metodo_pagamento, Some(FieldErrorReason::Inactive));
            let lines_e = e.itens.unwrap();
            let actual = lines_e
                .linhas
                .iter()
                .map(|l| (l.produto_id, l.produto.clone()))
                .collect::<Vec<_>>();
            let expect = vec![
                (dessert, Some(FieldErrorReason::Inactive)),
                (9999, Some(FieldErrorReason::NotExist)),
            ];
            assert_eq!(actual, expect);
        }
        _others => panic!("expect client error"),
    }
}

#[tokio::test]
async fn place_order_unknown_pay_method() {
    let repos = ut_setup_repos().await;
    let mut req = ut_req_with_lines(&[(repos.products[0], 1, 2250)]);
    req.pedido.metodo_pagamento = "boleto".to_string();
    let uc = PlaceOrderUseCase {
        repo_order: repos.order,
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: None,
    };
    match uc.execute(req).await {
        Err(PlaceOrderUsKsErr::ReqContent(e)) => {
            assert_eq!(e.metodo_pagamento, Some(FieldErrorReason::NotExist));
            assert!(e.itens.is_none());
        }
        _others => panic!("expect client error"),
    }
}

#[tokio::test]
async fn place_order_save_failure() {
    let repos = ut_setup_repos().await;
    let req = ut_req_with_lines(&[(repos.products[0], 1, 2250)]);
    let mock_order = MockOrderRepo {
        create_result: Err(AppError {
            code: AppErrorCode::ExceedingMaxLimit,
            detail: Some("utest".to_string()),
        }),
        fetch_result: Ok(None),
    };
    let uc = PlaceOrderUseCase {
        repo_order: Box::new(mock_order),
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: Some("11987654321".to_string()),
    };
    match uc.execute(req).await {
        Err(PlaceOrderUsKsErr::CreationFailed(e)) => {
            assert_eq!(e.code, AppErrorCode::OrderCreationFailed);
            assert!(e.detail.unwrap().contains("ExceedingMaxLimit"));
        }
        _others => panic!("expect creation failure"),
    }
}

#[tokio::test]
async fn place_order_saved_but_missing() {
    let repos = ut_setup_repos().await;
    let req = ut_req_with_lines(&[(repos.products[0], 1, 2250)]);
    let mock_order = MockOrderRepo {
        create_result: Ok(37),
        fetch_result: Ok(None),
    };
    let uc = PlaceOrderUseCase {
        repo_order: Box::new(mock_order),
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: None,
    };
    match uc.execute(req).await {
        Err(PlaceOrderUsKsErr::CreationFailed(e)) => {
            assert_eq!(e.code, AppErrorCode::OrderCreationFailed);
            assert!(e.detail.unwrap().contains("OrderNotExist"));
        }
        _others => panic!("expect creation failure"),
    }
}

#[tokio::test]
async fn place_order_mocked_fetch_ok() {
    let repos = ut_setup_repos().await;
    let req = ut_req_with_lines(&[(repos.products[0], 1, 2250)]);
    let saved = crate::model::ut_saved_order(OrderDeliveryModel::Pickup, Decimal::ZERO);
    let mock_order = MockOrderRepo {
        create_result: Ok(saved.id),
        fetch_result: Ok(Some(saved)),
    };
    let uc = PlaceOrderUseCase {
        repo_order: Box::new(mock_order),
        repo_catalog: repos.catalog,
        logctx: ut_log_context(),
        notify_phone: Some("".to_string()),
    };
    let resp = match uc.execute(req).await {
        Ok(v) => v,
        Err(_e) => panic!("expect order placed"),
    };
    // response always reflects the persisted order
    assert_eq!(resp.pedido.id, 42);
    assert_eq!(resp.pedido.total, Decimal::new(5100, 2));
    let notify = resp.whatsapp.unwrap();
    let expect_prefix = format!("{WHATSAPP_DEEPLINK_BASE}?phone=&text=");
    assert!(notify.link.starts_with(expect_prefix.as_str()));
}
