pub mod ecef;
pub mod geodesy;
pub mod lambert;

pub use ecef::*;
pub use geodesy::*;
pub use lambert::*;
