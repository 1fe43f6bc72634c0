pub mod asset;
pub mod asset_history;
pub mod import_record;
pub mod verification;
