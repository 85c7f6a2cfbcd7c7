//! Directory entry and listing types.

mod entry;

pub(crate) use entry::ListResponse;
pub use entry::{Entry, Listing, format_size};
