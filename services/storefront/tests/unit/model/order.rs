use std::str::FromStr;

use rust_decimal::Decimal;

use storefront::api::web::dto::{
    CustomerReqDto, FieldErrorReason, OrderCreateReqData, OrderDto, OrderLineReqDto,
    OrderMetaReqDto,
};
use storefront::error::AppErrorCode;
use storefront::model::{OrderCreateModel, OrderDeliveryModel, OrderStatus};

use super::ut_saved_order;

pub(crate) fn ut_order_req(entrega: bool, fee: Decimal) -> OrderCreateReqData {
    let (rua, numero, bairro) = if entrega {
        (
            Some("Rua das Flores".to_string()),
            Some("120".to_string()),
            Some("Vila Nova".to_string()),
        )
    } else {
        (None, None, None)
    };
    OrderCreateReqData {
        cliente: CustomerReqDto {
            nome: " Joana Lima ".to_string(),
            telefone: "(21) 99876-1234".to_string(),
        },
        pedido: OrderMetaReqDto {
            total: None,
            taxa_entrega: fee,
            metodo_pagamento: "pix".to_string(),
            status: Some("Concluído".to_string()),
            entrega,
            rua,
            numero,
            bairro,
            observacoes: Some("  ".to_string()),
        },
        itens: vec![
            OrderLineReqDto {
                produto_id: 3,
                quantidade: 2,
                preco_unitario: Decimal::new(2250, 2),
            },
            OrderLineReqDto {
                produto_id: 8,
                quantidade: 1,
                preco_unitario: Decimal::new(600, 2),
            },
        ],
    }
} // end of fn ut_order_req

#[test]
fn create_model_delivery_ok() {
    let req = ut_order_req(true, Decimal::new(850, 2));
    let model = OrderCreateModel::try_from(req).unwrap();
    assert_eq!(model.customer.name.as_str(), "Joana Lima");
    assert_eq!(model.customer.phone.as_str(), "(21) 99876-1234");
    assert_eq!(model.subtotal(), Decimal::new(5100, 2));
    assert_eq!(model.delivery_fee, Decimal::new(850, 2));
    assert_eq!(model.product_ids(), vec![3, 8]);
    assert!(model.notes.is_none());
    match model.delivery {
        OrderDeliveryModel::Delivery { neighborhood, .. } => {
            assert_eq!(neighborhood.as_str(), "Vila Nova")
        }
        OrderDeliveryModel::Pickup => panic!("expect delivery"),
    }
}

#[test]
fn create_model_pickup_ok() {
    let mut req = ut_order_req(false, Decimal::ZERO);
    // address fields are ignored for pickup
    req.pedido.rua = Some("Rua X".to_string());
    let model = OrderCreateModel::try_from(req).unwrap();
    assert_eq!(model.delivery, OrderDeliveryModel::Pickup);
    assert_eq!(model.delivery_fee, Decimal::ZERO);
}

#[test]
fn create_model_customer_empty() {
    let mut req = ut_order_req(false, Decimal::ZERO);
    req.cliente.nome = "  ".to_string();
    let e = OrderCreateModel::try_from(req).err().unwrap();
    let cust_e = e.cliente.unwrap();
    assert_eq!(cust_e.nome, Some(FieldErrorReason::Empty));
    assert!(cust_e.telefone.is_none());
    assert!(e.entrega.is_none());
    assert!(e.itens.is_none());
}

#[test]
fn create_model_delivery_error() {
    let mut req = ut_order_req(true, Decimal::new(-1, 0));
    req.pedido.bairro = None;
    req.pedido.numero = Some("".to_string());
    let e = OrderCreateModel::try_from(req).err().unwrap();
    let dlvr_e = e.entrega.unwrap();
    assert_eq!(dlvr_e.taxa_entrega, Some(FieldErrorReason::Negative));
    assert_eq!(dlvr_e.bairro, Some(FieldErrorReason::Empty));
    assert_eq!(dlvr_e.numero, Some(FieldErrorReason::Empty));
    assert!(dlvr_e.rua.is_none());
}

#[test]
fn create_model_pickup_with_fee() {
    let req = ut_order_req(false, Decimal::new(500, 2));
    let e = OrderCreateModel::try_from(req).err().unwrap();
    let dlvr_e = e.entrega.unwrap();
    assert_eq!(dlvr_e.taxa_entrega, Some(FieldErrorReason::NonZero));
}

#[test]
fn create_model_merge_repeated_product() {
    let mut req = ut_order_req(false, Decimal::ZERO);
    req.itens.push(OrderLineReqDto {
        produto_id: 3,
        quantidade: 3,
        preco_unitario: Decimal::new(2250, 2),
    });
    let model = OrderCreateModel::try_from(req).unwrap();
    assert_eq!(model.lines.len(), 2);
    assert_eq!(model.product_ids(), vec![3, 8]);
    assert_eq!(model.lines[0].quantity, 5);
    assert_eq!(model.lines[0].unit_price, Decimal::new(2250, 2));
    assert_eq!(model.subtotal(), Decimal::new(11850, 2));
}

#[test]
fn create_model_client_total_is_subtotal() {
    let mut req = ut_order_req(true, Decimal::new(850, 2));
    req.pedido.total = Some(Decimal::new(5100, 2));
    let model = OrderCreateModel::try_from(req).unwrap();
    assert!(model.client_total_mismatch().is_none());
    let mut req = ut_order_req(true, Decimal::new(850, 2));
    // subtotal plus delivery fee is not what client should send
    req.pedido.total = Some(Decimal::new(5950, 2));
    let model = OrderCreateModel::try_from(req).unwrap();
    let expect = (Decimal::new(5950, 2), Decimal::new(5100, 2));
    assert_eq!(model.client_total_mismatch(), Some(expect));
    let req = ut_order_req(true, Decimal::new(850, 2));
    let model = OrderCreateModel::try_from(req).unwrap();
    assert!(model.client_total_mismatch().is_none());
}

#[test]
fn create_model_lines_error() {
    let mut req = ut_order_req(false, Decimal::ZERO);
    // same product with another price snapshot
    req.itens.push(OrderLineReqDto {
        produto_id: 3,
        quantidade: 1,
        preco_unitario: Decimal::new(2400, 2),
    });
    req.itens.push(OrderLineReqDto {
        produto_id: 15,
        quantidade: 0,
        preco_unitario: Decimal::new(-5, 0),
    });
    req.pedido.metodo_pagamento = " ".to_string();
    let e = OrderCreateModel::try_from(req).err().unwrap();
    assert_eq!(e.metodo_pagamento, Some(FieldErrorReason::Empty));
    let lines_e = e.itens.unwrap();
    assert!(lines_e.geral.is_none());
    assert_eq!(lines_e.linhas.len(), 2);
    assert_eq!(lines_e.linhas[0].produto_id, 3);
    assert_eq!(lines_e.linhas[0].produto, Some(FieldErrorReason::Duplicate));
    assert_eq!(lines_e.linhas[1].produto_id, 15);
    assert_eq!(lines_e.linhas[1].quantidade, Some(FieldErrorReason::NotPositive));
    assert_eq!(lines_e.linhas[1].preco_unitario, Some(FieldErrorReason::Negative));
}

#[test]
fn create_model_empty_cart() {
    let mut req = ut_order_req(false, Decimal::ZERO);
    req.itens.clear();
    let e = OrderCreateModel::try_from(req).err().unwrap();
    let lines_e = e.itens.unwrap();
    assert_eq!(lines_e.geral, Some(FieldErrorReason::Empty));
    assert!(lines_e.linhas.is_empty());
}

#[test]
fn status_transition() {
    let mut status = OrderStatus::Pending;
    assert!(status.transit(OrderStatus::Preparing).is_ok());
    assert!(status.transit(OrderStatus::OutForDelivery).is_ok());
    assert!(status.transit(OrderStatus::Completed).is_ok());
    assert_eq!(status, OrderStatus::Completed);
    assert!(status.is_terminal());
    let e = status.transit(OrderStatus::Cancelled).err().unwrap();
    assert_eq!(e.code, AppErrorCode::InvalidOrderStatus);
    assert_eq!(status, OrderStatus::Completed);

    let mut status = OrderStatus::Preparing;
    assert!(status.transit(OrderStatus::Pending).is_err());
    assert!(status.transit(OrderStatus::Preparing).is_err());
    assert!(status.transit(OrderStatus::Cancelled).is_ok());
    assert!(status.is_terminal());
}

#[test]
fn status_parse_label() {
    for st in OrderStatus::ALL {
        assert_eq!(OrderStatus::from_str(st.label()).unwrap(), st);
    }
    assert_eq!(
        OrderStatus::from_str("Saiu para Entrega").unwrap(),
        OrderStatus::OutForDelivery
    );
    let e = OrderStatus::from_str("em preparo").err().unwrap();
    assert_eq!(e.code, AppErrorCode::InvalidOrderStatus);
    assert!(OrderStatus::from_str("").is_err());
    let serial = serde_json::to_string(&OrderStatus::Completed).unwrap();
    assert_eq!(serial.as_str(), "\"Concluído\"");
}

#[test]
fn saved_order_to_dto() {
    let delivery = OrderDeliveryModel::Delivery {
        street: "Rua das Flores".to_string(),
        number: "120".to_string(),
        neighborhood: "Vila Nova".to_string(),
    };
    let order = ut_saved_order(delivery, Decimal::new(850, 2));
    assert_eq!(order.total(), Decimal::new(5950, 2));
    let dto = OrderDto::from(order);
    assert_eq!(dto.total, Decimal::new(5950, 2));
    assert!(dto.entrega);
    assert_eq!(dto.bairro.as_deref(), Some("Vila Nova"));
    assert_eq!(dto.itens.len(), 2);
    assert_eq!(dto.itens[0].total, Decimal::new(4500, 2));
    assert_eq!(dto.status, OrderStatus::Pending);
    assert_eq!(dto.cliente.id, 5);
}
