use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextClusterError>;

#[derive(Error, Debug)]
pub enum TextClusterError {
    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl TextClusterError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
