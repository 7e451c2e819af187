use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::AbrechnungError;
use crate::totals;
use crate::types::{Invoice, LineItem, Period, PriceType};
use crate::validation;

/// Builder for constructing valid invoices.
///
/// ```
/// use abrechnung::{InvoiceBuilder, LineItemBuilder};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new(
///     "inv-2025-001",
///     "cust-42",
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
/// )
/// .add_line(LineItemBuilder::new("li-1", dec!(10.33), dec!(1)).build())
/// .build()
/// .unwrap();
///
/// assert_eq!(invoice.totals.unwrap().subtotal, dec!(10.33));
/// ```
pub struct InvoiceBuilder {
    id: String,
    customer_id: String,
    currency: String,
    issue_date: NaiveDate,
    period: Option<Period>,
    line_items: Vec<LineItem>,
}

impl InvoiceBuilder {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            currency: "usd".to_string(),
            issue_date,
            period: None,
            line_items: Vec::new(),
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some(Period { start, end });
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Build the invoice, composing totals and running validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, AbrechnungError> {
        // Input limit to prevent abuse
        if self.line_items.len() > 10_000 {
            return Err(AbrechnungError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }

        let mut invoice = self.assemble();
        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AbrechnungError::Validation(msg));
        }

        totals::compose_totals(&mut invoice);
        Ok(invoice)
    }

    /// Build without validation — useful for testing or importing external
    /// data.
    pub fn build_unchecked(self) -> Invoice {
        let mut invoice = self.assemble();
        totals::compose_totals(&mut invoice);
        invoice
    }

    fn assemble(self) -> Invoice {
        Invoice {
            id: self.id,
            customer_id: self.customer_id,
            currency: self.currency,
            issue_date: self.issue_date,
            period: self.period,
            line_items: self.line_items,
            totals: None,
        }
    }
}

/// Builder for [`LineItem`].
pub struct LineItemBuilder {
    id: String,
    price_id: Option<String>,
    display_name: Option<String>,
    price_type: PriceType,
    amount: Decimal,
    quantity: Decimal,
    currency: String,
    period: Option<Period>,
}

impl LineItemBuilder {
    /// `amount` is the gross line amount, already rounded to currency
    /// precision (round at source).
    pub fn new(id: impl Into<String>, amount: Decimal, quantity: Decimal) -> Self {
        Self {
            id: id.into(),
            price_id: None,
            display_name: None,
            price_type: PriceType::Usage,
            amount,
            quantity,
            currency: "usd".to_string(),
            period: None,
        }
    }

    pub fn price_type(mut self, price_type: PriceType) -> Self {
        self.price_type = price_type;
        self
    }

    pub fn price_id(mut self, id: impl Into<String>) -> Self {
        self.price_id = Some(id.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some(Period { start, end });
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            id: self.id,
            price_id: self.price_id,
            display_name: self.display_name,
            price_type: self.price_type,
            amount: self.amount,
            quantity: self.quantity,
            currency: self.currency,
            period: self.period,
            line_item_discount: Decimal::ZERO,
            invoice_level_discount: Decimal::ZERO,
            prepaid_credits_applied: Decimal::ZERO,
        }
    }
}
