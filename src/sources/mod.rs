//! Concrete portal adapters

mod portal;

pub use portal::PortalAdapter;
