// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod json_mapper;
pub mod openuv_repository;
pub mod purpleair_repository;
