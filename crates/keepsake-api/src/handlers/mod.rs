pub mod albums;
pub mod health;
pub mod photos;
pub mod uploads;
