use chrono::{DateTime, FixedOffset, Local as LocalTime};
use rust_decimal::Decimal;

use crate::api::web::dto::{CustomerReqDto, OrderCreateReqData, OrderLineReqDto, OrderMetaReqDto};

use super::catalog::{NeighborhoodModelSet, ProductModel};
use super::currency::{format_amount, line_total};

#[derive(Debug, Clone, PartialEq)]
pub struct CartItemModel {
    pub product: ProductModel,
    pub quantity: u32,
    // set once on the first add, it is the display key of the group
    pub added_at: DateTime<FixedOffset>,
}

impl CartItemModel {
    pub fn line_total(&self) -> Decimal {
        line_total(self.product.price, self.quantity)
    }
}

#[derive(Debug, Clone)]
pub enum CartAction {
    AddItem {
        product: ProductModel,
        time: DateTime<FixedOffset>,
    },
    RemoveItem {
        product_id: u32,
        added_at: DateTime<FixedOffset>,
    },
    Clear,
}

/// State of the visitor's cart, at most one item per product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartModel {
    items: Vec<CartItemModel>,
    total: Decimal,
}

impl CartModel {
    /// Pure transition from previous state and an action to the next state,
    /// total is recomputed on every change.
    pub fn reduce(self, action: CartAction) -> Self {
        let mut items = self.items;
        match action {
            CartAction::AddItem { product, time } => {
                if let Some(found) = items.iter_mut().find(|i| i.product.id == product.id) {
                    found.quantity += 1;
                } else {
                    items.push(CartItemModel {
                        product,
                        quantity: 1,
                        added_at: time,
                    });
                }
            }
            CartAction::RemoveItem {
                product_id,
                added_at,
            } => {
                let pos = items
                    .iter()
                    .position(|i| i.product.id == product_id && i.added_at == added_at);
                if let Some(idx) = pos {
                    if items[idx].quantity > 1 {
                        items[idx].quantity -= 1;
                    } else {
                        items.remove(idx);
                    }
                }
            }
            CartAction::Clear => {
                items.clear();
            }
        }
        let total = items.iter().map(CartItemModel::line_total).sum();
        Self { items, total }
    } // end of fn reduce

    pub fn items(&self) -> &[CartItemModel] {
        &self.items
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn total_display(&self) -> String {
        format_amount(self.total)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
} // end of impl CartModel

pub enum CartDeliveryChoice {
    Pickup,
    Delivery {
        street: String,
        number: String,
        neighborhood_id: u32,
    },
}

/// Owner of the cart state, passed explicitly to whoever renders or submits
/// the cart.
#[derive(Debug, Default)]
pub struct CartStore {
    state: CartModel,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: CartAction) {
        let prev = std::mem::take(&mut self.state);
        self.state = prev.reduce(action);
    }

    pub fn add_item(&mut self, product: ProductModel) {
        let time = LocalTime::now().fixed_offset();
        self.dispatch(CartAction::AddItem { product, time });
    }

    pub fn remove_item(&mut self, item: &CartItemModel) {
        self.dispatch(CartAction::RemoveItem {
            product_id: item.product.id,
            added_at: item.added_at,
        });
    }

    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    pub fn state(&self) -> &CartModel {
        &self.state
    }

    pub fn total(&self) -> Decimal {
        self.state.total()
    }

    /// Build the order submission payload from current cart content, unit
    /// prices are the ones captured when products were added.
    pub fn checkout(
        &self,
        customer: CustomerReqDto,
        choice: CartDeliveryChoice,
        neighborhoods: &NeighborhoodModelSet,
        pay_method: &str,
        notes: Option<String>,
    ) -> OrderCreateReqData {
        let itens = self
            .state
            .items()
            .iter()
            .map(|i| OrderLineReqDto {
                produto_id: i.product.id,
                quantidade: i.quantity as i32,
                preco_unitario: i.product.price,
            })
            .collect();
        let (entrega, rua, numero, bairro, taxa_entrega) = match choice {
            CartDeliveryChoice::Pickup => (false, None, None, None, Decimal::ZERO),
            CartDeliveryChoice::Delivery {
                street,
                number,
                neighborhood_id,
            } => {
                let fee = neighborhoods.delivery_fee(Some(neighborhood_id));
                let nb_name = neighborhoods.find(neighborhood_id).map(|n| n.name.clone());
                (true, Some(street), Some(number), nb_name, fee)
            }
        };
        let pedido = OrderMetaReqDto {
            total: Some(self.total()),
            taxa_entrega,
            metodo_pagamento: pay_method.to_string(),
            status: None,
            entrega,
            rua,
            numero,
            bairro,
            observacoes: notes,
        };
        OrderCreateReqData {
            cliente: customer,
            pedido,
            itens,
        }
    } // end of fn checkout
} // end of impl CartStore
