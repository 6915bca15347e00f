//! Read path: predicate construction, validation, pagination and the
//! `FeedView` response envelope.

mod engine;
mod predicate;
mod validation;

pub use engine::{FeedQueryEngine, FeedView, total_pages};
pub use predicate::{FeedPredicate, FeedSort, SortDirection, SortField};
pub use validation::{PageRequest, PriceBound, ValidationError, validate_price_bounds, validate_tag};
