use std::fmt::Write as _;

use crate::{
    error::{AppError, Result},
    integrations::{InvoiceData, InvoiceRenderer},
};

/// Formats minor units as `1234.50`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Plain-text invoices.
pub struct TextInvoiceRenderer;

impl InvoiceRenderer for TextInvoiceRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, invoice: &InvoiceData) -> Result<Vec<u8>> {
        let order = &invoice.order;
        let mut out = String::new();
        let fmt_err = |e: std::fmt::Error| AppError::Internal(format!("Invoice rendering failed: {}", e));

        writeln!(out, "Invoice #{}", order.id).map_err(fmt_err)?;
        writeln!(out, "Date: {}", order.created_at.format("%Y-%m-%d")).map_err(fmt_err)?;
        writeln!(out, "Status: {}", order.status).map_err(fmt_err)?;
        writeln!(out).map_err(fmt_err)?;
        writeln!(out, "Buyer: {} ({})", invoice.buyer_name, order.buyer_id).map_err(fmt_err)?;
        writeln!(out, "Seller: {} ({})", invoice.seller_name, order.seller_id).map_err(fmt_err)?;
        writeln!(out, "Shipping Address: {}", order.shipping_address).map_err(fmt_err)?;
        writeln!(out).map_err(fmt_err)?;
        writeln!(out, "Items").map_err(fmt_err)?;

        for (item, name) in &invoice.lines {
            writeln!(
                out,
                "  {} x {} @ {} = {}",
                item.quantity,
                name,
                format_amount(item.unit_price_cents),
                format_amount(item.subtotal_cents())
            )
            .map_err(fmt_err)?;
        }

        writeln!(out).map_err(fmt_err)?;
        writeln!(
            out,
            "Total: {} {}",
            format_amount(order.total_price_cents),
            invoice.currency
        )
        .map_err(fmt_err)?;

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderItem, OrderStatus};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(1005), "10.05");
        assert_eq!(format_amount(-250), "-2.50");
    }

    #[test]
    fn test_render_lists_items_and_total() {
        let order_id = Uuid::new_v4();
        let order = Order {
            id: order_id,
            buyer_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            delivery_agent_id: None,
            status: OrderStatus::Pending,
            total_price_cents: 2500,
            shipping_address: "12 Fern Lane".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id,
            plant_id: Uuid::new_v4(),
            quantity: 2,
            unit_price_cents: 1250,
        };
        let invoice = InvoiceData {
            order,
            buyer_name: "Asha".to_string(),
            seller_name: "Green Co".to_string(),
            lines: vec![(item, "Snake Plant".to_string())],
            currency: "INR".to_string(),
        };

        let text = String::from_utf8(TextInvoiceRenderer.render(&invoice).unwrap()).unwrap();
        assert!(text.contains(&format!("Invoice #{}", order_id)));
        assert!(text.contains("2 x Snake Plant @ 12.50 = 25.00"));
        assert!(text.contains("Total: 25.00 INR"));
    }
}
