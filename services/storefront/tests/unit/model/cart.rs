use rust_decimal::Decimal;

use storefront::api::web::dto::CustomerReqDto;
use storefront::model::{
    format_amount, CartAction, CartDeliveryChoice, CartModel, CartStore, NeighborhoodModel,
    NeighborhoodModelSet,
};

use super::{ut_product, ut_time};

fn ut_neighborhoods() -> NeighborhoodModelSet {
    NeighborhoodModelSet(vec![
        NeighborhoodModel {
            id: 4,
            name: "Centro".to_string(),
            fee: Decimal::new(500, 2),
            active: true,
        },
        NeighborhoodModel {
            id: 9,
            name: "Vila Nova".to_string(),
            fee: Decimal::new(850, 2),
            active: true,
        },
    ])
}

#[test]
fn reduce_add_same_product_merges() {
    let first_time = ut_time("2024-03-02T19:00:00-03:00");
    let later = ut_time("2024-03-02T19:03:00-03:00");
    let burger = ut_product(3, "X-Burger", Decimal::new(2250, 2));
    let state = CartModel::default()
        .reduce(CartAction::AddItem {
            product: burger.clone(),
            time: first_time,
        })
        .reduce(CartAction::AddItem {
            product: burger,
            time: later,
        });
    assert_eq!(state.items().len(), 1);
    let item = &state.items()[0];
    assert_eq!(item.quantity, 2);
    // group keeps the time of its first addition
    assert_eq!(item.added_at, first_time);
    assert_eq!(state.total(), Decimal::new(4500, 2));
}

#[test]
fn reduce_add_distinct_products() {
    let t0 = ut_time("2024-03-02T19:00:00-03:00");
    let state = CartModel::default()
        .reduce(CartAction::AddItem {
            product: ut_product(3, "X-Burger", Decimal::new(2250, 2)),
            time: t0,
        })
        .reduce(CartAction::AddItem {
            product: ut_product(8, "Guarana 350ml", Decimal::new(600, 2)),
            time: t0,
        })
        .reduce(CartAction::AddItem {
            product: ut_product(8, "Guarana 350ml", Decimal::new(600, 2)),
            time: t0,
        });
    let summary = state
        .items()
        .iter()
        .map(|i| (i.product.id, i.quantity))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![(3, 1), (8, 2)]);
    assert_eq!(state.total(), Decimal::new(3450, 2));
    assert!(!state.is_empty());
}

#[test]
fn reduce_remove_decrement_then_drop() {
    let t0 = ut_time("2024-03-02T19:00:00-03:00");
    let state = CartModel::default()
        .reduce(CartAction::AddItem {
            product: ut_product(3, "X-Burger", Decimal::new(2250, 2)),
            time: t0,
        })
        .reduce(CartAction::AddItem {
            product: ut_product(3, "X-Burger", Decimal::new(2250, 2)),
            time: t0,
        });
    let state = state.reduce(CartAction::RemoveItem {
        product_id: 3,
        added_at: t0,
    });
    assert_eq!(state.items()[0].quantity, 1);
    assert_eq!(state.total(), Decimal::new(2250, 2));
    let state = state.reduce(CartAction::RemoveItem {
        product_id: 3,
        added_at: t0,
    });
    assert!(state.is_empty());
    assert_eq!(state.total(), Decimal::ZERO);
}

#[test]
fn reduce_remove_unknown_group_ignored() {
    let t0 = ut_time("2024-03-02T19:00:00-03:00");
    let other_time = ut_time("2024-03-02T19:10:00-03:00");
    let state = CartModel::default().reduce(CartAction::AddItem {
        product: ut_product(3, "X-Burger", Decimal::new(2250, 2)),
        time: t0,
    });
    let expect = state.clone();
    let state = state.reduce(CartAction::RemoveItem {
        product_id: 3,
        added_at: other_time,
    });
    assert_eq!(state, expect);
    let state = state.reduce(CartAction::RemoveItem {
        product_id: 99,
        added_at: t0,
    });
    assert_eq!(state, expect);
}

#[test]
fn reduce_clear() {
    let t0 = ut_time("2024-03-02T19:00:00-03:00");
    let state = CartModel::default()
        .reduce(CartAction::AddItem {
            product: ut_product(3, "X-Burger", Decimal::new(2250, 2)),
            time: t0,
        })
        .reduce(CartAction::Clear);
    assert!(state.is_empty());
    assert_eq!(state.total(), Decimal::ZERO);
    assert_eq!(state.total_display(), format_amount(Decimal::ZERO));
}

#[test]
fn store_dispatch_and_remove_item() {
    let mut store = CartStore::new();
    store.add_item(ut_product(3, "X-Burger", Decimal::new(2250, 2)));
    store.add_item(ut_product(3, "X-Burger", Decimal::new(2250, 2)));
    store.add_item(ut_product(11, "Batata frita", Decimal::new(1290, 2)));
    assert_eq!(store.total(), Decimal::new(5790, 2));
    let burger = store.state().items()[0].clone();
    store.remove_item(&burger);
    assert_eq!(store.state().items()[0].quantity, 1);
    assert_eq!(store.total(), Decimal::new(3540, 2));
    store.clear();
    assert!(store.state().is_empty());
}

#[test]
fn checkout_delivery_payload() {
    let mut store = CartStore::new();
    store.add_item(ut_product(3, "X-Burger", Decimal::new(2250, 2)));
    store.add_item(ut_product(3, "X-Burger", Decimal::new(2250, 2)));
    store.add_item(ut_product(8, "Guarana 350ml", Decimal::new(600, 2)));
    let customer = CustomerReqDto {
        nome: "Joana Lima".to_string(),
        telefone: "21998761234".to_string(),
    };
    let choice = CartDeliveryChoice::Delivery {
        street: "Rua das Flores".to_string(),
        number: "120".to_string(),
        neighborhood_id: 9,
    };
    let payload = store.checkout(
        customer,
        choice,
        &ut_neighborhoods(),
        "pix",
        Some("sem cebola".to_string()),
    );
    assert_eq!(payload.itens.len(), 2);
    assert_eq!(payload.itens[0].produto_id, 3);
    assert_eq!(payload.itens[0].quantidade, 2);
    assert_eq!(payload.itens[0].preco_unitario, Decimal::new(2250, 2));
    let meta = &payload.pedido;
    assert!(meta.entrega);
    assert_eq!(meta.taxa_entrega, Decimal::new(850, 2));
    assert_eq!(meta.bairro.as_deref(), Some("Vila Nova"));
    assert_eq!(meta.rua.as_deref(), Some("Rua das Flores"));
    // subtotal of the items, delivery fee travels separately
    assert_eq!(meta.total, Some(Decimal::new(5100, 2)));
    assert_eq!(meta.metodo_pagamento.as_str(), "pix");
    assert!(meta.status.is_none());
    assert_eq!(payload.cliente.nome.as_str(), "Joana Lima");
} // end of fn checkout_delivery_payload

#[test]
fn checkout_pickup_payload() {
    let mut store = CartStore::new();
    store.add_item(ut_product(11, "Batata frita", Decimal::new(1290, 2)));
    let customer = CustomerReqDto {
        nome: "Caio".to_string(),
        telefone: "11912345678".to_string(),
    };
    let payload = store.checkout(
        customer,
        CartDeliveryChoice::Pickup,
        &ut_neighborhoods(),
        "dinheiro",
        None,
    );
    let meta = &payload.pedido;
    assert!(!meta.entrega);
    assert_eq!(meta.taxa_entrega, Decimal::ZERO);
    assert!(meta.rua.is_none());
    assert!(meta.bairro.is_none());
    assert_eq!(meta.total, Some(Decimal::new(1290, 2)));
}
