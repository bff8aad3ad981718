//! Background processors.

pub mod delivery;

pub use delivery::{DEFAULT_COLLECT_URL, DeliveryError, DeliveryLoop};
