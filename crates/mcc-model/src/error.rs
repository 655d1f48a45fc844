use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("required field name must not be blank")]
    BlankFieldName,
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_message() {
        assert_eq!(
            ModelError::BlankFieldName.to_string(),
            "required field name must not be blank"
        );
    }
}
