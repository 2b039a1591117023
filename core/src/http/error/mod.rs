mod security_error;

pub use security_error::{
    find_security_failure, AccessDeniedError, AuthenticationError, SecurityFailure,
};
