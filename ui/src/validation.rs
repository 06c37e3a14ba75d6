use crate::error::AppError;

/// Core validation trait that all validators must implement.
///
/// This trait provides a consistent interface for validating user input
/// before anything is sent to the engine or the catalog.
///
/// # Examples
///
/// ```
/// use reskin::validation::Validator;
///
/// struct NotEmpty;
/// impl Validator<str> for NotEmpty {
///     type Error = String;
///
///     fn validate(&self, input: &str) -> Result<(), Self::Error> {
///         if input.is_empty() {
///             Err("Input cannot be empty".to_string())
///         } else {
///             Ok(())
///         }
///     }
/// }
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// Minimum password length accepted by the account backend
pub const MIN_PASSWORD_LEN: usize = 8;

/// Input validation errors with user-friendly messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputValidationError {
    #[error("{field_name} cannot be empty")]
    Empty { field_name: String },

    #[error("{field_name} must be {expected_format}")]
    InvalidFormat {
        field_name: String,
        expected_format: String,
    },

    #[error("{field_name} must be at least {min_length} characters")]
    TooShort {
        field_name: String,
        min_length: usize,
    },
}

impl From<InputValidationError> for AppError {
    fn from(err: InputValidationError) -> Self {
        AppError::Auth(err.to_string())
    }
}

/// Loose email check: one `@` with text on both sides and a dot in the domain
pub struct EmailValidator;

impl Validator<str> for EmailValidator {
    type Error = InputValidationError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(InputValidationError::Empty {
                field_name: "Email".to_string(),
            });
        }

        let valid = match input.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            }
            None => false,
        };

        if valid {
            Ok(())
        } else {
            Err(InputValidationError::InvalidFormat {
                field_name: "Email".to_string(),
                expected_format: "an address like name@example.com".to_string(),
            })
        }
    }
}

pub struct PasswordValidator;

impl Validator<str> for PasswordValidator {
    type Error = InputValidationError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.is_empty() {
            return Err(InputValidationError::Empty {
                field_name: "Password".to_string(),
            });
        }
        if input.chars().count() < MIN_PASSWORD_LEN {
            return Err(InputValidationError::TooShort {
                field_name: "Password".to_string(),
                min_length: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}
