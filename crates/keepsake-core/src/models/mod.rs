pub mod album;
pub mod media;

pub use album::{Album, CoupleNames, CreateAlbumRequest, UpdateAlbumRequest};
pub use media::{MediaRecord, NewMediaRecord};
