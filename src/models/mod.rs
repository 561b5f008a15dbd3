pub mod item;
pub mod page;
pub mod word;

pub use item::{BillItem, ParsedItem, TokenUsage};
pub use page::{DocumentResult, PageResult, PageStatus, PageType, TotalsMap};
pub use word::{Line, NumericToken, WordBox};
