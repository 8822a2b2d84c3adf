//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod activity_service;
pub mod automation_service;
pub mod dispatch_service;
pub mod note_service;
pub mod settings_service;

pub use activity_service::ActivityService;
pub use automation_service::AutomationService;
pub use dispatch_service::DispatchService;
pub use note_service::NoteService;
pub use settings_service::SettingsService;
