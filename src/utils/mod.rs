// Utility modules for the Moments backend

pub mod api_error;
pub mod error_strings;
pub mod password;
pub mod response;
pub mod validation;

pub use api_error::{conflict_message, ApiError};
pub use password::{hash_password, verify_password, PasswordError};
pub use response::{ApiResponse, Page};
pub use validation::{
    trim_and_validate_field, trim_optional_field, username_from_email, validate_password_strength,
    validate_username,
};
