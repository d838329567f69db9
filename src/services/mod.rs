pub mod fixer_api;
pub mod fixer_map_service;
pub mod fixer_profile_service;
