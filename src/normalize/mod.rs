//! Pure normalization helpers used by the transform stage
//!
//! Everything in this module is a pure function over text or numbers. The
//! transformer composes these; nothing here touches config, IO, or clocks.

mod address;
mod extract;
mod features;
mod numeric;
mod text;

pub use address::{abbreviate_street, is_valid_state, state_to_code, zip5};
pub use extract::{extract_bathrooms, extract_bedrooms, extract_square_feet};
pub use features::{extract_features, merge_features};
pub use numeric::{parse_number, parse_price_cents, price_number_to_cents};
pub use text::{clean_text, title_case_address};
