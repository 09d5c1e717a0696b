//! Services module
//!
//! The entity access layer and the back-office services built on it.

pub mod auth;
pub mod dashboard;
pub mod entities;
pub mod gate;
pub mod images;
pub mod management;
pub mod search;

pub use auth::{AdminIdentity, AuthService, DefaultAdmin};
pub use dashboard::{DashboardService, DashboardStats};
pub use entities::{Entities, EntityAccess};
pub use gate::{AdminGate, AdminScreen, GateState};
pub use images::ImageService;
pub use management::{ImageUpload, Management};
pub use search::{filter_records, Searchable};
