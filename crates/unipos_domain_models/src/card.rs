//! Credit card value object.

use error_stack::report;
use masking::{PeekInterface, Secret, StrongSecret};

use crate::{
    enums::CardBrand,
    errors::{MappingError, MappingResult},
};

/// Immutable card data, read-only input to the request mappers.
///
/// Expiry formatting differs per gateway (`MM/YY`, `YYMM`, `YYYYMM`), so
/// the card exposes one formatter per shape instead of a single canonical
/// string.
#[derive(Clone, Debug)]
pub struct CreditCard {
    number: StrongSecret<String>,
    exp_month: u8,
    exp_year: u16,
    cvv: Secret<String>,
    holder_name: Option<Secret<String>>,
    brand: Option<CardBrand>,
}

impl CreditCard {
    /// Build a card, validating the expiry shape.
    ///
    /// Accepts two- or four-digit years; two-digit years are taken as
    /// 2000-based, matching what the banks' form fields carry.
    pub fn new(
        number: StrongSecret<String>,
        exp_month: u8,
        exp_year: u16,
        cvv: Secret<String>,
        holder_name: Option<Secret<String>>,
        brand: Option<CardBrand>,
    ) -> MappingResult<Self> {
        if !(1..=12).contains(&exp_month) {
            return Err(report!(MappingError::InvalidDataFormat {
                field_name: "exp_month",
            }));
        }
        let exp_year = match exp_year {
            0..=99 => 2000 + exp_year,
            1000..=9999 => exp_year,
            _ => {
                return Err(report!(MappingError::InvalidDataFormat {
                    field_name: "exp_year",
                }))
            }
        };
        Ok(Self {
            number,
            exp_month,
            exp_year,
            cvv,
            holder_name,
            brand,
        })
    }

    /// Card PAN.
    pub fn number(&self) -> &str {
        self.number.peek()
    }

    /// Card verification value.
    pub fn cvv(&self) -> &str {
        self.cvv.peek()
    }

    /// Cardholder name, when supplied.
    pub fn holder_name(&self) -> Option<&str> {
        self.holder_name.as_ref().map(|name| name.peek().as_str())
    }

    pub fn brand(&self) -> Option<CardBrand> {
        self.brand
    }

    /// Zero-padded two-digit expiry month, e.g. `03`.
    pub fn exp_month(&self) -> String {
        format!("{:02}", self.exp_month)
    }

    /// Two-digit expiry year, e.g. `26`.
    pub fn exp_year_short(&self) -> String {
        format!("{:02}", self.exp_year % 100)
    }

    /// `MM/YY`, e.g. `12/26`.
    pub fn expiry_mm_slash_yy(&self) -> String {
        format!("{:02}/{:02}", self.exp_month, self.exp_year % 100)
    }

    /// `YYMM`, e.g. `2612`.
    pub fn expiry_yymm(&self) -> String {
        format!("{:02}{:02}", self.exp_year % 100, self.exp_month)
    }

    /// `YYYYMM`, e.g. `202612`.
    pub fn expiry_yyyymm(&self) -> String {
        format!("{:04}{:02}", self.exp_year, self.exp_month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(month: u8, year: u16) -> CreditCard {
        CreditCard::new(
            "4242424242424242".into(),
            month,
            year,
            "123".into(),
            Some("john doe".into()),
            Some(CardBrand::Visa),
        )
        .unwrap()
    }

    #[test]
    fn expiry_formats() {
        let card = card(3, 2026);
        assert_eq!("03/26", card.expiry_mm_slash_yy());
        assert_eq!("2603", card.expiry_yymm());
        assert_eq!("202603", card.expiry_yyyymm());
        assert_eq!("03", card.exp_month());
        assert_eq!("26", card.exp_year_short());
    }

    #[test]
    fn two_digit_year_is_normalized() {
        assert_eq!("202612", card(12, 26).expiry_yyyymm());
    }

    #[test]
    fn invalid_month_is_rejected() {
        let result = CreditCard::new("4242".into(), 13, 2026, "000".into(), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_pan_and_cvv() {
        let formatted = format!("{:?}", card(12, 2026));
        assert!(!formatted.contains("4242"));
        assert!(!formatted.contains("123"));
    }
}
