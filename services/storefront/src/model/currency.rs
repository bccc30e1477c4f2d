use rust_decimal::Decimal;
use rusty_money::{iso, Money};

/// The only way money is rendered for people, cart total and notification
/// message share this, so the figures shown at checkout match the message
/// byte for byte.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    Money::from_decimal(rounded, iso::BRL).to_string()
}

pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}
