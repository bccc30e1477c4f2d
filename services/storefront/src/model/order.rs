use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::web::dto::{
    CustomerDto, CustomerErrorDto, CustomerReqDto, DeliveryErrorDto, FieldErrorReason,
    OrderCreateReqData, OrderCreateRespErrorDto, OrderDto, OrderLineDto, OrderLineErrorDto,
    OrderLineReqDto, OrderLinesErrorDto, OrderMetaReqDto,
};
use crate::constant::limit::MAX_ORDER_LINES_PER_REQUEST;
use crate::error::{AppError, AppErrorCode};

use super::currency::line_total;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Em Preparo")]
    Preparing,
    #[serde(rename = "Saiu para Entrega")]
    OutForDelivery,
    #[serde(rename = "Concluído")]
    Completed,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Preparing => "Em Preparo",
            Self::OutForDelivery => "Saiu para Entrega",
            Self::Completed => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn can_transit(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing)
                | (Self::Preparing, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Completed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Preparing, Self::Cancelled)
                | (Self::OutForDelivery, Self::Cancelled)
        )
    }

    pub fn transit(&mut self, next: Self) -> DefaultResult<(), AppError> {
        if self.can_transit(next) {
            *self = next;
            Ok(())
        } else {
            let detail = format!("from:{}, to:{}", self.label(), next.label());
            Err(AppError {
                code: AppErrorCode::InvalidOrderStatus,
                detail: Some(detail),
            })
        }
    }
} // end of impl OrderStatus

impl FromStr for OrderStatus {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.label() == s)
            .ok_or_else(|| AppError {
                code: AppErrorCode::InvalidOrderStatus,
                detail: Some(format!("unknown-status:{s}")),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerContactModel {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerModel {
    pub id: u32,
    pub name: String,
    pub phone: String,
    pub create_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderDeliveryModel {
    Pickup,
    Delivery {
        street: String,
        number: String,
        neighborhood: String,
    },
}

impl OrderDeliveryModel {
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineCreateModel {
    pub product_id: u32,
    pub quantity: u32,
    // snapshot taken when the product was put into the cart
    pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct OrderCreateModel {
    pub customer: CustomerContactModel,
    pub delivery: OrderDeliveryModel,
    pub delivery_fee: Decimal,
    pub pay_method: String,
    pub notes: Option<String>,
    pub lines: Vec<OrderLineCreateModel>,
    // items only, delivery fee excluded
    pub client_total: Option<Decimal>,
}

impl OrderCreateModel {
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| line_total(l.unit_price, l.quantity))
            .sum()
    }

    pub fn product_ids(&self) -> Vec<u32> {
        self.lines.iter().map(|l| l.product_id).collect()
    }

    /// `(given, computed)` when the total sent by client differs from the
    /// subtotal of the lines, the server figure always wins
    pub fn client_total_mismatch(&self) -> Option<(Decimal, Decimal)> {
        let computed = self.subtotal();
        self.client_total
            .filter(|given| *given != computed)
            .map(|given| (given, computed))
    }

    fn validate_customer(
        data: CustomerReqDto,
    ) -> DefaultResult<CustomerContactModel, CustomerErrorDto> {
        let (name, phone) = (data.nome.trim(), data.telefone.trim());
        if name.is_empty() || phone.is_empty() {
            Err(CustomerErrorDto {
                nome: name.is_empty().then_some(FieldErrorReason::Empty),
                telefone: phone.is_empty().then_some(FieldErrorReason::Empty),
            })
        } else {
            Ok(CustomerContactModel {
                name: name.to_string(),
                phone: phone.to_string(),
            })
        }
    }

    fn validate_delivery(
        meta: &OrderMetaReqDto,
    ) -> DefaultResult<(OrderDeliveryModel, Decimal), DeliveryErrorDto> {
        let mut e = DeliveryErrorDto::default();
        let fee = meta.taxa_entrega;
        if fee < Decimal::ZERO {
            e.taxa_entrega = Some(FieldErrorReason::Negative);
        } else if !meta.entrega && !fee.is_zero() {
            e.taxa_entrega = Some(FieldErrorReason::NonZero);
        }
        let delivery = if meta.entrega {
            let fields = [&meta.rua, &meta.numero, &meta.bairro].map(|v| optional_text(v.as_deref()));
            let [street, number, neighborhood] = fields;
            e.rua = street.is_none().then_some(FieldErrorReason::Empty);
            e.numero = number.is_none().then_some(FieldErrorReason::Empty);
            e.bairro = neighborhood.is_none().then_some(FieldErrorReason::Empty);
            match (street, number, neighborhood) {
                (Some(street), Some(number), Some(neighborhood)) => Some(OrderDeliveryModel::Delivery {
                    street,
                    number,
                    neighborhood,
                }),
                _others => None,
            }
        } else {
            Some(OrderDeliveryModel::Pickup)
        };
        match delivery {
            Some(d) if e.taxa_entrega.is_none() => Ok((d, fee)),
            _others => Err(e),
        }
    } // end of fn validate_delivery

    fn validate_lines(
        data: Vec<OrderLineReqDto>,
    ) -> DefaultResult<Vec<OrderLineCreateModel>, OrderLinesErrorDto> {
        if data.is_empty() || data.len() > MAX_ORDER_LINES_PER_REQUEST {
            let reason = if data.is_empty() {
                FieldErrorReason::Empty
            } else {
                FieldErrorReason::ExceedLimit
            };
            return Err(OrderLinesErrorDto {
                geral: Some(reason),
                linhas: Vec::new(),
            });
        }
        // position of each product in `valid`, repeated lines of the same
        // product and price are merged into the first one
        let mut seen: HashMap<u32, usize> = HashMap::new();
        let mut errors = Vec::new();
        let mut valid: Vec<OrderLineCreateModel> = Vec::new();
        for item in data {
            let qty_err = (item.quantidade <= 0).then_some(FieldErrorReason::NotPositive);
            let price_err = (item.preco_unitario < Decimal::ZERO).then_some(FieldErrorReason::Negative);
            let mut dup_err = None;
            if qty_err.is_none() && price_err.is_none() {
                let quantity = item.quantidade as u32;
                match seen.get(&item.produto_id).copied() {
                    Some(idx) if valid[idx].unit_price == item.preco_unitario => {
                        match valid[idx].quantity.checked_add(quantity) {
                            Some(v) => valid[idx].quantity = v,
                            None => dup_err = Some(FieldErrorReason::ExceedLimit),
                        }
                    }
                    // two different price snapshots of one product
                    Some(_idx) => dup_err = Some(FieldErrorReason::Duplicate),
                    None => {
                        seen.insert(item.produto_id, valid.len());
                        valid.push(OrderLineCreateModel {
                            product_id: item.produto_id,
                            quantity,
                            unit_price: item.preco_unitario,
                        });
                    }
                }
            }
            if dup_err.is_some() || qty_err.is_some() || price_err.is_some() {
                errors.push(OrderLineErrorDto {
                    produto_id: item.produto_id,
                    produto: dup_err,
                    quantidade: qty_err,
                    preco_unitario: price_err,
                });
            }
        }
        if errors.is_empty() {
            Ok(valid)
        } else {
            Err(OrderLinesErrorDto {
                geral: None,
                linhas: errors,
            })
        }
    } // end of fn validate_lines
} // end of impl OrderCreateModel

fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl TryFrom<OrderCreateReqData> for OrderCreateModel {
    type Error = OrderCreateRespErrorDto;

    fn try_from(value: OrderCreateReqData) -> DefaultResult<Self, Self::Error> {
        let OrderCreateReqData {
            cliente,
            pedido,
            itens,
        } = value;
        let mut err_obj = OrderCreateRespErrorDto::default();
        let customer = Self::validate_customer(cliente)
            .map_err(|e| err_obj.cliente = Some(e))
            .ok();
        let delivery = Self::validate_delivery(&pedido)
            .map_err(|e| err_obj.entrega = Some(e))
            .ok();
        let pay_method = optional_text(Some(pedido.metodo_pagamento.as_str()));
        if pay_method.is_none() {
            err_obj.metodo_pagamento = Some(FieldErrorReason::Empty);
        }
        let lines = Self::validate_lines(itens)
            .map_err(|e| err_obj.itens = Some(e))
            .ok();
        match (customer, delivery, pay_method, lines) {
            (Some(customer), Some((delivery, delivery_fee)), Some(pay_method), Some(lines)) => {
                Ok(Self {
                    customer,
                    delivery,
                    delivery_fee,
                    pay_method,
                    lines,
                    notes: optional_text(pedido.observacoes.as_deref()),
                    client_total: pedido.total,
                })
            }
            _others => Err(err_obj),
        }
    } // end of fn try_from
} // end of impl OrderCreateModel

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineModel {
    pub id: u32,
    pub product_id: u32,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLineModel {
    pub fn total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// persisted order joined with its customer and lines
#[derive(Debug, Clone, PartialEq)]
pub struct OrderModel {
    pub id: u32,
    pub customer: CustomerModel,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub pay_method: String,
    pub status: OrderStatus,
    pub delivery: OrderDeliveryModel,
    pub notes: Option<String>,
    pub create_time: DateTime<FixedOffset>,
    pub lines: Vec<OrderLineModel>,
}

impl OrderModel {
    pub fn total(&self) -> Decimal {
        self.subtotal + self.delivery_fee
    }
}

impl From<OrderLineModel> for OrderLineDto {
    fn from(value: OrderLineModel) -> Self {
        let total = value.total();
        Self {
            id: value.id,
            produto_id: value.product_id,
            produto_nome: value.product_name,
            quantidade: value.quantity,
            preco_unitario: value.unit_price,
            total,
        }
    }
}

impl From<OrderModel> for OrderDto {
    fn from(value: OrderModel) -> Self {
        let total = value.total();
        let entrega = value.delivery.is_delivery();
        let (rua, numero, bairro) = match value.delivery {
            OrderDeliveryModel::Pickup => (None, None, None),
            OrderDeliveryModel::Delivery {
                street,
                number,
                neighborhood,
            } => (Some(street), Some(number), Some(neighborhood)),
        };
        Self {
            id: value.id,
            cliente: CustomerDto {
                id: value.customer.id,
                nome: value.customer.name,
                telefone: value.customer.phone,
            },
            subtotal: value.subtotal,
            taxa_entrega: value.delivery_fee,
            total,
            metodo_pagamento: value.pay_method,
            status: value.status,
            entrega,
            rua,
            numero,
            bairro,
            observacoes: value.notes,
            created_at: value.create_time.to_rfc3339(),
            itens: value.lines.into_iter().map(OrderLineDto::from).collect(),
        }
    }
} // end of impl OrderDto
