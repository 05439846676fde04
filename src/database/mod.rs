// src/database/mod.rs
//! Repositories over the SQLite pool. Each borrows the pool for the duration
//! of a request and reports failures as `DataStoreError`.

pub mod applications;
pub mod cvs;
pub mod job_offers;
pub mod user_roles;

pub use applications::ApplicationRepository;
pub use cvs::CvRepository;
pub use job_offers::JobOfferRepository;
pub use user_roles::UserRoleRepository;
