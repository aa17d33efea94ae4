//! Error taxonomy for the labyrinth simulation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabyrinthError {
    /// A wire-level action token outside the closed six-member vocabulary.
    #[error("{name} is not a valid action for this environment")]
    InvalidAction { name: String },

    /// An operation that needs an agent ran before one was placed.
    #[error("no agent was initialized, cannot {operation}")]
    UninitializedAgent { operation: String },

    /// A strategy needs a goal but no target has been designated.
    #[error("no target has been initialized in this environment")]
    MissingTarget,

    #[error("malformed world layout: {message}")]
    MalformedLayout { message: String },

    /// An episode record that cannot be parsed (missing or reordered
    /// sections, unparseable literals). No partial result is returned.
    #[error("malformed episode recording: {message}")]
    MalformedRecording { message: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl LabyrinthError {
    pub fn invalid_action<S: Into<String>>(name: S) -> Self {
        Self::InvalidAction { name: name.into() }
    }

    pub fn malformed_layout<S: Into<String>>(message: S) -> Self {
        Self::MalformedLayout {
            message: message.into(),
        }
    }

    pub fn malformed_recording<S: Into<String>>(message: S) -> Self {
        Self::MalformedRecording {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for LabyrinthError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
