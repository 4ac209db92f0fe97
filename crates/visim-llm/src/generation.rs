/// Generation seam between the HTTP handlers and the hosted model.
///
/// Handlers only see [`GenerationClient`], so tests can swap in a canned client
/// without any network access.
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GenerationError;
use crate::openai::{
    ChatCompletionRequest, ChatCompletionResponse, JsonSchemaFormat, Message, OpenAiClient,
    ResponseFormat,
};

#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A named JSON schema the model output must satisfy.
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl StructuredSchema {
    pub fn of<T: JsonSchema>(name: &str) -> Self {
        let mut schema = serde_json::Value::from(schemars::schema_for!(T));
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        Self {
            name: name.to_string(),
            schema,
        }
    }
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Free-text completion for `request.prompt`.
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError>;

    /// Completion constrained to `schema`, returned as parsed JSON.
    async fn generate_json(
        &self,
        request: TextRequest,
        schema: StructuredSchema,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// Structured generation: derive the schema from `T`, ask for it, and reject
/// anything that does not deserialize into `T`.
pub async fn generate_object<T>(
    client: &dyn GenerationClient,
    request: TextRequest,
    name: &str,
) -> Result<T, GenerationError>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = StructuredSchema::of::<T>(name);
    let value = client.generate_json(request, schema).await?;
    serde_json::from_value(value).map_err(|e| GenerationError::Schema(e.to_string()))
}

impl OpenAiClient {
    async fn complete(
        &self,
        request: TextRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<String, GenerationError> {
        let chat = ChatCompletionRequest {
            model: self.config().model.clone(),
            messages: vec![Message::user(request.prompt)],
            temperature: request.temperature,
            max_tokens: None,
            response_format,
        };
        let response = self.chat_completions(&chat).await?;

        debug!(
            model = %chat.model,
            total_tokens = ?response.usage.as_ref().and_then(|u| u.total_tokens),
            "completion received"
        );

        completion_text(&response)
    }
}

/// Trimmed text of the first choice; blank or missing content is an error.
fn completion_text(response: &ChatCompletionResponse) -> Result<String, GenerationError> {
    response
        .first_content()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(GenerationError::EmptyCompletion)
}

fn parse_structured(text: &str) -> Result<serde_json::Value, GenerationError> {
    serde_json::from_str(text)
        .map_err(|e| GenerationError::Schema(format!("output is not valid JSON: {e}")))
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        self.complete(request, None).await
    }

    async fn generate_json(
        &self,
        request: TextRequest,
        schema: StructuredSchema,
    ) -> Result<serde_json::Value, GenerationError> {
        let format = ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: schema.name,
                schema: schema.schema,
                strict: None,
            },
        };
        let text = self.complete(request, Some(format)).await?;
        parse_structured(&text)
    }
}
