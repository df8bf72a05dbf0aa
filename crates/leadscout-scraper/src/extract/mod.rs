//! Contact and position extraction from detail pages.

pub mod coordinates;
pub mod phone;
pub mod pipeline;

pub use coordinates::{resolve_coordinates, CoordinateStrategy};
pub use phone::{find_phone_in_text, normalize_phone};
pub use pipeline::{ContactDetails, ContactExtractionPipeline, PhoneStrategy};
