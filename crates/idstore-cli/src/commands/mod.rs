pub mod grants;
pub mod migrate;
pub mod provision;
pub mod seed;
