pub mod place;
pub mod registry;

pub use place::{Buyer, Place, Storage};
pub use registry::PlaceRegistry;
