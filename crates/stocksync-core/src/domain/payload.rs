//! Order payload: what the confirm endpoint receives.
//!
//! The queue treats the payload as opaque once it is accepted, but it is
//! validated once at the enqueue boundary so that orders the server would
//! reject outright never sit in the queue.

use serde::{Deserialize, Serialize};

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product number as printed on the warehouse grid (e.g. "A-12").
    pub number: String,

    /// Quantity taken. Must be positive.
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(number: impl Into<String>, quantity: u32) -> Self {
        Self {
            number: number.into(),
            quantity,
        }
    }
}

/// The body of a confirm request.
///
/// Wire format:
/// `{"products":[{"number":"A-12","quantity":3}],"recipient_name":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// May be empty: the server records "no recipient" in that case.
    #[serde(default)]
    pub recipient_name: String,

    pub products: Vec<OrderLine>,
}

/// Why a payload was refused at the enqueue boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("order has no products")]
    NoProducts,

    #[error("product line {index} has an empty product number")]
    BlankProductNumber { index: usize },

    #[error("product {number} has zero quantity")]
    ZeroQuantity { number: String },
}

impl OrderPayload {
    pub fn new(recipient_name: impl Into<String>, products: Vec<OrderLine>) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            products,
        }
    }

    /// Validate and normalize (trim) the payload.
    ///
    /// Rules match the server's own checks on the confirm endpoint:
    /// - at least one product line
    /// - product numbers are non-blank
    /// - quantities are positive
    pub fn normalized(mut self) -> Result<Self, PayloadError> {
        if self.products.is_empty() {
            return Err(PayloadError::NoProducts);
        }

        self.recipient_name = self.recipient_name.trim().to_string();

        for (index, line) in self.products.iter_mut().enumerate() {
            line.number = line.number.trim().to_string();
            if line.number.is_empty() {
                return Err(PayloadError::BlankProductNumber { index });
            }
            if line.quantity == 0 {
                return Err(PayloadError::ZeroQuantity {
                    number: line.number.clone(),
                });
            }
        }

        Ok(self)
    }

    /// Sum of all quantities (used in log lines and the CLI listing).
    pub fn total_quantity(&self) -> u64 {
        self.products.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_fields() {
        let payload = OrderPayload::new("  Sami ", vec![OrderLine::new(" A-12 ", 3)])
            .normalized()
            .unwrap();

        assert_eq!(payload.recipient_name, "Sami");
        assert_eq!(payload.products[0].number, "A-12");
    }

    #[test]
    fn empty_recipient_is_allowed() {
        let payload = OrderPayload::new("", vec![OrderLine::new("B-1", 1)]).normalized();
        assert!(payload.is_ok());
    }

    #[test]
    fn rejects_empty_order() {
        let err = OrderPayload::new("x", vec![]).normalized().unwrap_err();
        assert_eq!(err, PayloadError::NoProducts);
    }

    #[test]
    fn rejects_blank_number_and_zero_quantity() {
        let err = OrderPayload::new("x", vec![OrderLine::new("A-1", 1), OrderLine::new("  ", 2)])
            .normalized()
            .unwrap_err();
        assert_eq!(err, PayloadError::BlankProductNumber { index: 1 });

        let err = OrderPayload::new("x", vec![OrderLine::new("A-1", 0)])
            .normalized()
            .unwrap_err();
        assert_eq!(
            err,
            PayloadError::ZeroQuantity {
                number: "A-1".to_string()
            }
        );
    }

    #[test]
    fn wire_format_matches_confirm_endpoint() {
        let payload = OrderPayload::new("Sami", vec![OrderLine::new("A-12", 3)]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "recipient_name": "Sami",
                "products": [{"number": "A-12", "quantity": 3}],
            })
        );
        assert_eq!(payload.total_quantity(), 3);
    }
}
