//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod automation_repo;
pub mod clock;
pub mod email_log;
pub mod invoices;
pub mod mailer;
pub mod notes;
pub mod secrets;
pub mod state_store;

pub use automation_repo::AutomationRepository;
pub use clock::{Clock, ManualClock, SystemClock};
pub use email_log::EmailLogRepository;
pub use invoices::InvoiceSource;
pub use mailer::{DispatchContext, Mailer, SentEmail};
pub use notes::NoteRepository;
pub use secrets::SecretRepository;
pub use state_store::StateStore;
