//! Input rules shared by every feed read. Nothing here clamps: a value is
//! either accepted as given or rejected.

use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("page size must be a positive integer, got {0}")]
    InvalidPageSize(i64),
    #[error("page number must be a positive integer, got {0}")]
    InvalidPageNumber(i64),
    #[error("tag must not be empty")]
    EmptyTag,
    #[error("{bound} price must not be negative, got {value}")]
    NegativePrice { bound: PriceBound, value: Decimal },
    #[error("minimum price {min} exceeds maximum price {max}")]
    InvertedPriceRange { min: Decimal, max: Decimal },
    #[error("at least one of minimum or maximum price is required")]
    MissingPriceBound,
    /// A parameter could not be parsed at all (e.g. `page_size=2.5`).
    #[error("malformed parameter: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Min,
    Max,
}

impl fmt::Display for PriceBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceBound::Min => write!(f, "minimum"),
            PriceBound::Max => write!(f, "maximum"),
        }
    }
}

/// A validated 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: u64,
    page: u64,
}

impl PageRequest {
    pub const FIRST_PAGE: i64 = 1;

    pub fn new(page_size: i64, page: i64) -> Result<Self, ValidationError> {
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ValidationError::InvalidPageSize(page_size))?;
        let page = u64::try_from(page)
            .ok()
            .filter(|page| *page > 0)
            .ok_or(ValidationError::InvalidPageNumber(page))?;
        Ok(Self { page_size, page })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Rows before this page: `(page - 1) * page_size`.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Returns the trimmed tag.
pub fn validate_tag(tag: &str) -> Result<String, ValidationError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTag);
    }
    Ok(trimmed.to_owned())
}

/// Each supplied bound must be non-negative and `min <= max` when both are.
pub fn validate_price_bounds(
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<(), ValidationError> {
    for (bound, value) in [(PriceBound::Min, min), (PriceBound::Max, max)] {
        if let Some(value) = value {
            if value < Decimal::ZERO {
                return Err(ValidationError::NegativePrice { bound, value });
            }
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::InvertedPriceRange { min, max });
        }
    }
    Ok(())
}
