pub mod asset_history_repo;
pub mod asset_repo;
pub mod import_record_repo;
pub mod import_repo;
pub mod verification_repo;

pub use asset_history_repo::AssetHistoryRepo;
pub use asset_repo::AssetRepo;
pub use import_record_repo::ImportRecordRepo;
pub use import_repo::ImportRepo;
pub use verification_repo::VerificationRepo;
