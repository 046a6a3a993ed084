//! Storage adapters for Foodgram.
//!
//! [`pg_store::PgStore`] implements every repository port on `PostgreSQL`;
//! [`fs_image_store::FsImageStore`] keeps uploaded images on local disk.

pub mod fs_image_store;
pub mod pg_store;
