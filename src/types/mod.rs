// src/types/mod.rs
pub mod analysis;
pub mod application;
pub mod cv;
pub mod job;
pub mod user;

pub use analysis::{AnalyzeCvRequest, AnalyzeCvResponse, CvAnalysis};
pub use application::{Application, ApplicationStats, ApplicationStatus, ApplicationSummary};
pub use cv::CvRecord;
pub use job::{JobCard, JobOffer, JobOfferPatch, JobStatus, NewJobOffer};
pub use user::{Role, Session, SessionUser, UserRole};
