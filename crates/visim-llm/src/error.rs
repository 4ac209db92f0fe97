/// Errors surfaced by text and structured generation.
///
/// Messages are meant to be shown to the HTTP caller unchanged, so each variant
/// renders the upstream detail rather than wrapping it in extra context.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Client(#[from] crate::openai::OpenAiClientError),

    #[error("generation service returned an empty completion")]
    EmptyCompletion,

    #[error("generated output does not match schema: {0}")]
    Schema(String),

    #[error("{0}")]
    Service(String),
}
