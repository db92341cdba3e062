//! Degree-of-freedom numbering and index sets

mod handler;
mod index_set;

pub use handler::*;
pub use index_set::*;
