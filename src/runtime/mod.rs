//! Chat surface controllers.

pub mod attachments;
pub mod dispatcher;
pub mod health;
pub mod page;

pub use attachments::{AttachmentRetriever, RetrieveOutcome};
pub use dispatcher::{Dispatcher, SubmitOutcome, SubmitRejection};
pub use health::{HealthProber, HealthStatus};
pub use page::ChatPage;
