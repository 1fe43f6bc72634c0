pub mod assets;
pub mod imports;
pub mod verification;
