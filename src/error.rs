use thiserror::Error;

/// Everything that can stop a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("request to page views API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("file operation failed: {path} - {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no items returned in page views report for {date}")]
    EmptyReport { date: String },

    #[error("invalid bucket name: {name}")]
    InvalidBucketName { name: String },

    #[error("object storage {operation} failed: {message}")]
    ObjectStore { operation: String, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    pub fn file_io<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    pub fn json<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn object_store<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::ObjectStore {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
