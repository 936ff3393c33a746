pub mod filter;
pub mod rng;
pub mod session;
pub mod sort;
pub mod view;

pub use filter::{FilterState, RangeFilter, SizeFilter};
pub use session::{reduce, Action, Disclosure, Paging, SessionState};
pub use sort::SortMode;
pub use view::{render, CatalogView, ViewConfig};
