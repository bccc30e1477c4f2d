use rust_decimal::Decimal;
use url::form_urlencoded::byte_serialize;

use crate::api::web::dto::NotifyLinkDto;
use crate::constant::WHATSAPP_DEEPLINK_BASE;

use super::currency::format_amount;
use super::order::{OrderDeliveryModel, OrderModel};

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyLinkModel {
    pub link: String,
    pub message: String,
}

impl NotifyLinkModel {
    pub fn compose(phone: &str, order: &OrderModel) -> Self {
        let message = format_order_message(order);
        let link = build_deep_link(phone, message.as_str());
        Self { link, message }
    }
}

impl From<NotifyLinkModel> for NotifyLinkDto {
    fn from(value: NotifyLinkModel) -> Self {
        Self {
            link: value.link,
            mensagem: value.message,
        }
    }
}

pub fn format_order_message(order: &OrderModel) -> String {
    let mut lines = vec![
        format!("*NOVO PEDIDO #{}*", order.id),
        String::new(),
        format!("*Cliente:* {}", order.customer.name),
        format!("*Telefone:* {}", order.customer.phone),
        String::new(),
        "*Itens:*".to_string(),
    ];
    lines.extend(order.lines.iter().map(|l| {
        format!(
            "- {}x {} ({})",
            l.quantity,
            l.product_name,
            format_amount(l.total())
        )
    }));
    lines.push(String::new());
    lines.push(format!("*Subtotal:* {}", format_amount(order.subtotal)));
    if order.delivery_fee > Decimal::ZERO {
        lines.push(format!(
            "*Taxa de entrega:* {}",
            format_amount(order.delivery_fee)
        ));
    }
    lines.push(format!("*Total:* {}", format_amount(order.total())));
    lines.push(format!("*Forma de pagamento:* {}", order.pay_method));
    lines.push(String::new());
    match &order.delivery {
        OrderDeliveryModel::Delivery {
            street,
            number,
            neighborhood,
        } => {
            lines.push("*Endereço de entrega:*".to_string());
            lines.push(format!("{street}, {number}"));
            lines.push(neighborhood.clone());
        }
        OrderDeliveryModel::Pickup => {
            lines.push("*Retirada no local*".to_string());
        }
    }
    if let Some(notes) = order.notes.as_ref().filter(|n| !n.is_empty()) {
        lines.push(String::new());
        lines.push(format!("*Observações:* {notes}"));
    }
    lines.join("\n")
} // end of fn format_order_message

/// Non-digit characters of the phone number are dropped, an empty phone
/// segment is not an error.
pub fn build_deep_link(phone: &str, message: &str) -> String {
    let digits = phone
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    // literal `+` is already escaped as `%2B`, every remaining `+` stands for
    // a space
    let encoded = byte_serialize(message.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{WHATSAPP_DEEPLINK_BASE}?phone={digits}&text={encoded}")
}
