#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid or contradictory input. The message is shown to the user as is.
    #[error("{0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_verbatim() {
        let err = CoreError::Validation("At least one image URL is required".into());
        assert_eq!(err.to_string(), "At least one image URL is required");
    }
}
