// Application layer - Use cases and repository ports
pub mod air_quality_service;
pub mod forecast_cache;
pub mod forecast_repository;
pub mod refresh_gate;
pub mod refresh_service;
pub mod uv_service;
