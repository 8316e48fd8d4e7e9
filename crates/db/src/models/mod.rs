pub mod encoding;
pub mod face;
pub mod person;
pub mod photo;

pub use encoding::FaceEncoding;
pub use face::{DetectedFace, NewDetectedFace};
pub use person::Person;
pub use photo::Photo;
