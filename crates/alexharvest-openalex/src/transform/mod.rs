//! Projection of decoded OpenAlex entities into output records

pub mod author;
pub mod work;

pub use author::{AuthorBasicRecord, AuthorDetailRecord, AuthorRow};
pub use work::{WorkAnchor, WorkPolicy, WorkRecord, WorkRow};
