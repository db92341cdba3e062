//! Sparse matrix structures
//!
//! - [`CsrMatrix`]: Compressed Sparse Row storage with mat-vec kernels
//! - [`TripletMatrix`]: assembly accumulator, finalized by `compress`
//! - [`Transposed`]: lazy transposed view over any operator

mod csr;
mod transpose;
mod triplet;

pub use csr::CsrMatrix;
pub use transpose::Transposed;
pub use triplet::TripletMatrix;
