//! # clustermap-types
//!
//! Plain geographic types shared by the clustermap view controller and its hosts.
//!
//! - **Coordinates**: `Location`
//! - **Viewport types**: `Region`, `Dimensions`, `EdgePadding`
//! - **Bounding boxes**: `BoundingBox`
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use clustermap_types::location::Location;
//! use clustermap_types::viewport::Region;
//!
//! let nyc = Location::new(40.7128, -74.0060);
//! let region = Region::centered_on(nyc, 0.5, 0.5);
//! assert_eq!(region.center(), nyc);
//! ```

pub mod bbox;
pub mod location;
pub mod viewport;

pub use bbox::BoundingBox;
pub use location::Location;
pub use viewport::{Dimensions, EdgePadding, Region};
