pub mod auth;
pub mod bootstrap;
pub mod catalog_view;
pub mod lifecycle;
pub mod report;

pub use auth::AuthFlow;
pub use catalog_view::{
    ActionOutcome, InstallStateAccessor, Marketplace, ThemeAction, ThemeCard, ThemeDetails,
};
pub use lifecycle::{
    Effect, LifecycleController, LifecycleState, SessionContext, StatusKind, StatusLine,
};
pub use report::ReportFlow;
