pub type TelopResult<T> = Result<T, TelopError>;

#[derive(thiserror::Error, Debug)]
pub enum TelopError {
    #[error("image load error: {0}")]
    ImageLoad(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("font resolution error: {0}")]
    FontResolution(String),

    #[error("external service error: {0}")]
    External(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TelopError {
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn font_resolution(msg: impl Into<String>) -> Self {
        Self::FontResolution(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::External(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
