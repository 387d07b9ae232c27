pub mod app_config;
pub mod database;
pub mod leg_repo;

pub use database::DbClient;
pub use leg_repo::PostgresEmptyLegRepository;
