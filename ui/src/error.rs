use crate::view::Notice;
use engine::common::{CatalogError, ErrorKind, ThemeError};
use std::fmt::Display;
use std::sync::mpsc::Sender;

/// Application-wide error types for the Reskin front end.
///
/// Engine failures keep their [`ThemeError`] so the lifecycle controller can
/// classify them by [`ErrorKind`]; catalog failures keep their
/// [`CatalogError`]. Everything else carries a message that is shown to the
/// user as is.
///
/// # Examples
///
/// ```no_run
/// use reskin::error::{AppError, ErrorReporter};
///
/// fn handle(error: AppError, reporter: &ErrorReporter) {
///     match error {
///         AppError::Config(_) => reporter.report_simple(error, "Config", "load"),
///         AppError::Catalog(_) => reporter.report_warning(error, "Marketplace", "browse"),
///         other => reporter.report_critical(other, "Startup", "Reskin could not start"),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration loading and validation errors.
    Config(String),

    /// A native command failed. The message is surfaced verbatim.
    Engine(ThemeError),

    /// The hosted catalog could not be reached or answered with an error.
    Catalog(CatalogError),

    /// Sign-in, sign-up and session errors.
    Auth(String),

    /// An action that is not valid in the current lifecycle state.
    State(String),

    /// Local file system failures outside the engine.
    Io(String),
}

impl AppError {
    /// The engine's error classification, when the error came from the engine.
    pub fn engine_kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Engine(error) => Some(error.kind()),
            AppError::Catalog(_) => Some(ErrorKind::Network),
            _ => None,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Engine(error) => write!(f, "{error}"),
            AppError::Catalog(error) => write!(f, "Catalog Error: {error}"),
            AppError::Auth(msg) => write!(f, "Authentication Error: {msg}"),
            AppError::State(msg) => write!(f, "State Error: {msg}"),
            AppError::Io(msg) => write!(f, "IO Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ThemeError> for AppError {
    fn from(err: ThemeError) -> Self {
        AppError::Engine(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Error severity levels for appropriate UI response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Show a warning and log
    Warning,
    /// Show an error and log
    Error,
    /// Show an error, log, and exit
    Critical,
}

/// Context information for errors
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
    pub user_message: String,
    pub technical_details: Option<String>,
    pub suggestion: Option<String>,
    pub severity: ErrorSeverity,
}

impl ErrorContext {
    /// Create new error context with a generic message. Use
    /// [`with_message`](Self::with_message) for explicit user messages.
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            user_message: format!("An error occurred in {component}. Please try again."),
            technical_details: None,
            suggestion: None,
            severity: ErrorSeverity::Error,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.user_message = message.to_string();
        self
    }

    pub fn with_technical_details(mut self, details: &str) -> Self {
        self.technical_details = Some(details.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Contextual error with rich information
#[derive(Debug, Clone)]
pub struct ContextualError {
    pub error: AppError,
    pub context: ErrorContext,
}

impl ContextualError {
    pub fn new(error: AppError, context: ErrorContext) -> Self {
        Self { error, context }
    }
}

impl Display for ContextualError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.context.user_message, self.error)
    }
}

/// Central error reporting system.
///
/// Logs every error with its context and forwards a user-facing [`Notice`]
/// to whoever renders them.
#[derive(Clone)]
pub struct ErrorReporter {
    tx: Sender<Notice>,
}

impl ErrorReporter {
    pub fn new(tx: Sender<Notice>) -> Self {
        Self { tx }
    }

    /// Report an error, showing its own message to the user
    pub fn report_simple(&self, error: AppError, component: &str, operation: &str) {
        let context = ErrorContext::new(component, operation).with_message(&error.to_string());
        self.report(error, context);
    }

    pub fn report_warning(&self, error: AppError, component: &str, operation: &str) {
        let context = ErrorContext::new(component, operation)
            .with_message(&error.to_string())
            .with_severity(ErrorSeverity::Warning);
        self.report(error, context);
    }

    /// Report an error severe enough to end the process
    pub fn report_critical(&self, error: AppError, component: &str, user_message: &str) {
        let context = ErrorContext::new(component, "startup")
            .with_message(user_message)
            .with_technical_details(&error.to_string())
            .with_severity(ErrorSeverity::Critical)
            .with_suggestion("Fix the problem above and run reskin again.");
        self.report(error, context);
    }

    /// Report error with full context
    pub fn report(&self, error: AppError, context: ErrorContext) {
        let contextual_error = ContextualError::new(error.clone(), context.clone());

        match context.severity {
            ErrorSeverity::Warning => log::warn!(
                "[{}:{}] {}{}",
                context.component,
                context.operation,
                contextual_error,
                Self::format_additional_context(&context)
            ),
            ErrorSeverity::Error => log::error!(
                "[{}:{}] {}{}",
                context.component,
                context.operation,
                contextual_error,
                Self::format_additional_context(&context)
            ),
            ErrorSeverity::Critical => log::error!(
                "[CRITICAL] [{}:{}] {}{}",
                context.component,
                context.operation,
                contextual_error,
                Self::format_additional_context(&context)
            ),
        }

        let notice = match context.severity {
            ErrorSeverity::Warning => Notice::Warning(Self::format_user_message(&context)),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                Notice::Error(Self::format_error(&error, &context))
            }
        };
        if let Err(e) = self.tx.send(notice) {
            log::error!("Failed to deliver error notice: {e}");
        }
    }

    fn format_additional_context(context: &ErrorContext) -> String {
        let mut parts = Vec::new();
        if let Some(ref technical_details) = context.technical_details {
            parts.push(format!("Technical: {technical_details}"));
        }
        if let Some(ref suggestion) = context.suggestion {
            parts.push(format!("Suggestion: {suggestion}"));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join("; "))
        }
    }

    fn format_user_message(context: &ErrorContext) -> String {
        let mut message = context.user_message.clone();
        if let Some(ref suggestion) = context.suggestion {
            message.push_str(&format!("\n{suggestion}"));
        }
        message
    }

    fn format_error(error: &AppError, context: &ErrorContext) -> String {
        let mut message = format!("{}: {}", Self::error_title(error), context.user_message);
        if let Some(ref technical) = context.technical_details {
            message.push_str(&format!("\nDetails: {technical}"));
        }
        if let Some(ref suggestion) = context.suggestion {
            message.push_str(&format!("\n{suggestion}"));
        }
        message
    }

    fn error_title(error: &AppError) -> &'static str {
        match error {
            AppError::Config(_) => "Configuration error",
            AppError::Engine(theme_error) => match theme_error.kind() {
                ErrorKind::Decode => "Invalid theme package",
                ErrorKind::Io => "Install failed",
                ErrorKind::PathSafety => "Unsafe theme name",
                ErrorKind::Apply => "Apply failed",
                ErrorKind::Network => "Network error",
                ErrorKind::Internal => "Internal error",
            },
            AppError::Catalog(_) => "Network error",
            AppError::Auth(_) => "Authentication error",
            AppError::State(_) => "Not now",
            AppError::Io(_) => "File error",
        }
    }
}
