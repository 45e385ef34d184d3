pub mod analytics;
pub mod frame;
pub mod performance;
pub mod price;
pub mod settings;
pub mod standing;
