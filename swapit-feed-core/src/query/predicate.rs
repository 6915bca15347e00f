use crate::entities::ListingSummary;
use rust_decimal::Decimal;

/// Conjunction of the filters a caller supplied.
///
/// `None` means the filter was not supplied at all; it is never a stand-in for
/// "match everything" and `Some(0)` is a real bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPredicate {
    pub tag: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl FeedPredicate {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn matches(&self, summary: &ListingSummary) -> bool {
        if let Some(tag) = &self.tag {
            if !summary.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if summary.price.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if summary.price.amount > max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort order. Ties on `created_at` are broken by id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FeedSort {
    /// The order every feed read uses.
    pub const NEWEST_FIRST: FeedSort = FeedSort {
        field: SortField::CreatedAt,
        direction: SortDirection::Descending,
    };
}

impl Default for FeedSort {
    fn default() -> Self {
        Self::NEWEST_FIRST
    }
}
