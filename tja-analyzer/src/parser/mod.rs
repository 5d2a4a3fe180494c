//! Model-reply recovery parser
//!
//! Turns free-form vision-model output into a [`Reading`](tja_common::Reading):
//! - `normalize` - code-fence stripping and quote normalization
//! - `cascade` - direct, enveloped array, enveloped object, pattern (in that order)
//! - `pattern` - `title - DD/MM/YYYY HH:MM - amount` regex fallback
//!
//! Everything here is pure and synchronous. The model-assisted last resort
//! lives in [`crate::services::prober`].

pub mod cascade;
pub mod normalize;
pub mod pattern;

pub use cascade::{parse_response, CascadeMatch, ParseAttempt, ParseFault, Strategy};
pub use pattern::{parse_pattern, parse_traffic};
