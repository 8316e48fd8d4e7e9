pub mod encoding_repo;
pub mod face_repo;
pub mod person_repo;
pub mod photo_repo;

pub use encoding_repo::EncodingRepo;
pub use face_repo::FaceRepo;
pub use person_repo::PersonRepo;
pub use photo_repo::PhotoRepo;
