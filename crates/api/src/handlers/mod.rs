pub mod faces;
pub mod health;
pub mod maintenance;
pub mod persons;
pub mod photos;
