pub mod analytics_service;
pub mod portfolio_service;
pub mod return_service;
pub mod weight_service;
