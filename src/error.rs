//! Error messages returned by this library

use url::Url;

/// Error messages returned by this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Activity is structurally invalid: unknown type, missing or invalid field
    #[error("Malformed activity: {0}")]
    MalformedActivity(String),
    /// A value did not have the expected `type`
    #[error("Unexpected activity type: {0}")]
    UnexpectedActivityType(String),
    /// The referenced object was not published from the local outbox
    #[error("Object {0} is not owned by this instance")]
    NotFromOutbox(String),
    /// The activity actor is not the actor of the object it refers to
    #[error("Actor {actor} is not allowed to act on {object}")]
    AuthorizationMismatch {
        /// Actor of the incoming activity
        actor: Url,
        /// Object the activity refers to
        object: String,
    },
    /// The actor of an activity is not the owner of the box it is posted to
    #[error("Actor {actor} cannot post into the outbox of {owner}")]
    ActorMismatch {
        /// Actor of the activity
        actor: Url,
        /// Owner of the outbox
        owner: Url,
    },
    /// No backend was configured
    #[error("A backend must be initialized")]
    UninitializedBackend,
    /// Activity ids are assigned once, when the activity is posted to an outbox
    #[error("Activity already has the id {0}")]
    IdAlreadyAssigned(Url),
    /// Identifier resolution limit was reached while processing an activity
    #[error("Fetch limit was reached while processing activity")]
    RequestLimit,
    /// JSON Error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Url Parse
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    /// Errors reported by the backend
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn malformed<T: Into<String>>(message: T) -> Self {
        Error::MalformedActivity(message.into())
    }

    /// Wrap any displayable backend error
    pub fn other<T: std::fmt::Display>(error: T) -> Self {
        Error::Other(error.to_string())
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
