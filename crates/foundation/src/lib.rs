pub mod bounds;
pub mod coords;
pub mod math;
pub mod parcel;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use coords::*;
pub use parcel::*;
