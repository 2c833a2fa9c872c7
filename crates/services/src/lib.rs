pub mod capakey;
pub mod error;
pub mod wfs;

pub use capakey::*;
pub use error::*;
pub use wfs::*;
