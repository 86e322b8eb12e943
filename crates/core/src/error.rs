use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Campaign not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl CampaignError {
    /// Errors the UI renders as a placeholder instead of failing the view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CampaignError::NotFound(_))
    }
}
