//! The scraped product row

/// Column headers written above the first row of an empty worksheet
pub const HEADER: [&str; 3] = ["Product Name", "Price", "Amount/Unit"];

/// One product as scraped from a page
///
/// All three fields are always present. A field that could not be located
/// holds the run's placeholder text instead. Records carry no identity; the
/// same product scraped twice yields two rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    /// Price as displayed, currency symbol and digits untouched
    pub price: String,
    /// Size or unit descriptor
    pub amount: String,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, price: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            amount: amount.into(),
        }
    }

    /// Returns the record as a spreadsheet row in header order
    pub fn to_row(&self) -> [String; 3] {
        [self.name.clone(), self.price.clone(), self.amount.clone()]
    }

    /// Returns true if any field holds the placeholder
    pub fn is_partial(&self, placeholder: &str) -> bool {
        self.name == placeholder || self.price == placeholder || self.amount == placeholder
    }
}
