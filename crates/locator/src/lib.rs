pub mod error;
pub mod locate;
pub mod query;
pub mod selectors;

pub use error::*;
pub use locate::*;
pub use query::*;
pub use selectors::*;
