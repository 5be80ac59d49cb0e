//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&dyn RowStore` as the first argument. Pass a user-scoped store (see
//! [`RowStore::for_user`](crate::RowStore::for_user)) for writes made on a
//! user's behalf.

pub mod brand_repo;
pub mod category_repo;
pub mod marker_repo;
pub mod vote_repo;

pub use brand_repo::BrandRepo;
pub use category_repo::CategoryRepo;
pub use marker_repo::{MarkerQuery, MarkerRepo, ProductOutcome};
pub use vote_repo::VoteRepo;
