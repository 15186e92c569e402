//! Ports - trait definitions for the remote backend-as-a-service.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod data;
mod describe;
mod storage;

pub use auth::{AuthGateway, Credentials};
pub use data::{BeerInsert, BreweryInsert, CommentInsert, DataGateway, RatingUpsert};
pub use describe::DescriptionGenerator;
pub use storage::{ImageUpload, ObjectStorage, object_path_from_url};
