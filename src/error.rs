pub type StatcardResult<T> = Result<T, StatcardError>;

#[derive(thiserror::Error, Debug)]
pub enum StatcardError {
    /// A required logical asset could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// The store has no blob under the requested logical name.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// Domain data violated an assumption a draw program relies on.
    #[error("data error: {0}")]
    Data(String),

    #[error("encode error: {0}")]
    Encode(String),

    /// The upstream cancellation signal fired between render phases.
    #[error("render canceled")]
    Canceled,

    /// Uniform boundary error every compositor failure is folded into.
    #[error("card generation failed: {0}")]
    CardGeneration(#[source] Box<StatcardError>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatcardError {
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Fold an internal failure into the single card-generation error.
    ///
    /// Cancellation keeps its own flavor so callers can tell an aborted
    /// render from a failed one; an already-wrapped error is not re-wrapped.
    pub fn into_card_generation(self) -> Self {
        match self {
            Self::Canceled => Self::Canceled,
            Self::CardGeneration(inner) => Self::CardGeneration(inner),
            other => Self::CardGeneration(Box::new(other)),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StatcardError::asset("x")
                .to_string()
                .contains("asset error:")
        );
        assert!(StatcardError::data("x").to_string().contains("data error:"));
        assert!(
            StatcardError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert!(
            StatcardError::not_found("bg")
                .to_string()
                .contains("asset not found:")
        );
    }

    #[test]
    fn card_generation_wraps_and_keeps_cause() {
        let err = StatcardError::asset("portrait_1 missing").into_card_generation();
        let msg = err.to_string();
        assert!(msg.contains("card generation failed"));
        assert!(msg.contains("portrait_1 missing"));
    }

    #[test]
    fn cancellation_survives_wrapping() {
        let err = StatcardError::Canceled.into_card_generation();
        assert!(err.is_canceled());
    }

    #[test]
    fn wrapping_is_not_applied_twice() {
        let once = StatcardError::data("empty floors").into_card_generation();
        let twice = once.into_card_generation();
        let msg = twice.to_string();
        assert_eq!(msg.matches("card generation failed").count(), 1);
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StatcardError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
