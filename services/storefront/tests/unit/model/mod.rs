mod cart;
pub(crate) mod order;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use storefront::model::{
    CustomerModel, OrderDeliveryModel, OrderLineModel, OrderModel, OrderStatus, ProductModel,
};

pub(crate) fn ut_product(id: u32, name: &str, price: Decimal) -> ProductModel {
    ProductModel {
        id,
        name: name.to_string(),
        description: None,
        price,
        image_url: None,
        category_id: Some(1),
        active: true,
    }
}

pub(crate) fn ut_time(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

pub(crate) fn ut_saved_order(delivery: OrderDeliveryModel, fee: Decimal) -> OrderModel {
    let lines = vec![
        OrderLineModel {
            id: 71,
            product_id: 3,
            product_name: "X-Burger".to_string(),
            quantity: 2,
            unit_price: Decimal::new(2250, 2),
        },
        OrderLineModel {
            id: 72,
            product_id: 8,
            product_name: "Guarana 350ml".to_string(),
            quantity: 1,
            unit_price: Decimal::new(600, 2),
        },
    ];
    OrderModel {
        id: 42,
        customer: CustomerModel {
            id: 5,
            name: "Joana Lima".to_string(),
            phone: "(21) 99876-1234".to_string(),
            create_time: ut_time("2024-03-01T18:30:00-03:00"),
        },
        subtotal: Decimal::new(5100, 2),
        delivery_fee: fee,
        pay_method: "pix".to_string(),
        status: OrderStatus::Pending,
        delivery,
        notes: None,
        create_time: ut_time("2024-03-02T19:05:00-03:00"),
        lines,
    }
}
