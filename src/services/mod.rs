//! Business logic services
//!
//! Each service owns one concern and takes its collaborators (store handle,
//! injected configuration values) at construction time. Handlers pass the
//! current identity in explicitly; no service reads ambient request state.

mod accounts;
mod analytics;
mod clicks;
mod creation;
mod resolution;

pub use accounts::{AccountService, ExternalIdentity};
pub use analytics::{AnalyticsService, LinkSummary};
pub use clicks::ClickRecorder;
pub use creation::{CreatedLink, LinkCreationService, OwnedCreateRequest};
pub use resolution::{Outcome, ResolutionService, VisitorInfo};
