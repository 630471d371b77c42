//! Fetching and extraction of conference records from the listings page.
//!
//! [`fetch_listing`] retrieves the raw document; [`extract_conferences`]
//! turns it into [`conftrack_shared::Conference`] records. The label-based
//! lookup the parser relies on lives behind the [`labels::LabelLookup`]
//! capability trait.

pub mod fetch;
pub mod labels;
pub mod parser;

pub use fetch::fetch_listing;
pub use labels::{Fragment, LabelLookup};
pub use parser::extract_conferences;
