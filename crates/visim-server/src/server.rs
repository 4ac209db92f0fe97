/// HTTP surface of the simulation generator.
///
/// Every handler is one linear pipeline: validate the body, assemble a prompt,
/// make a single generation call, shape the response. Failures become
/// `{ "error": ... }` bodies via [`AppError`].
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use visim_llm::generation::{generate_object, GenerationClient, TextRequest};

use crate::category::{key_concepts, select_category};
use crate::error::AppError;
use crate::model::{
    EnhancePromptRequest, EnhancePromptResponse, ExplainRequest, ExplainResponse,
    Explanations, GenerateCodeRequest, GenerateCodeResponse, GenerateRequest, GenerateResponse,
    HealthResponse, SandboxRequest, SandboxResponse, SimulationBrief, StructuredData, TextOrList,
    UiControls, UiControlsRequest, ValidateCodeRequest, ValidateCodeResponse,
};
use crate::output::{is_validation_error, sandbox_page, strip_code_fence, SANDBOX_NOTES};
use crate::prompt;
use crate::rate_limit::RateLimiter;
use crate::reference::ReferenceStore;

const DEFAULT_USER_LEVEL: &str = "intermediate";

const FEATURES: [&str; 6] = [
    "\u{2705} Real-time physics calculations",
    "\u{2705} Interactive parameter controls",
    "\u{2705} Pause/play functionality",
    "\u{2705} Professional gradient styling",
    "\u{2705} Educational physics information",
    "\u{2705} Responsive design",
];

const PIPELINE_STEPS: [&str; 6] = [
    "\u{2705} Physics concepts analyzed",
    "\u{2705} Reference patterns applied",
    "\u{2705} Interactive controls generated",
    "\u{2705} Real-time calculations implemented",
    "\u{2705} Professional styling applied",
    "\u{2705} Educational content added",
];

#[derive(Clone)]
pub struct AppState {
    llm: Arc<dyn GenerationClient>,
    references: Arc<ReferenceStore>,
    limiter: Option<RateLimiter>,
    has_api_key: bool,
}

impl AppState {
    pub fn new(
        llm: Arc<dyn GenerationClient>,
        references: ReferenceStore,
        limiter: Option<RateLimiter>,
        has_api_key: bool,
    ) -> Self {
        Self {
            llm,
            references: Arc::new(references),
            limiter,
            has_api_key,
        }
    }

    async fn gate(&self) -> Result<(), AppError> {
        if let Some(limiter) = &self.limiter {
            limiter
                .acquire()
                .await
                .map_err(|wait| AppError::RateLimited {
                    rps: limiter.rps(),
                    retry_after_ms: wait.as_millis() as u64,
                })?;
        }
        Ok(())
    }

    async fn text(&self, prompt: String, temperature: f32) -> Result<String, AppError> {
        self.gate().await?;
        let reply = self
            .llm
            .generate_text(TextRequest::new(prompt).with_temperature(temperature))
            .await?;
        Ok(reply)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/enhance-prompt", post(enhance_prompt))
        .route("/ui-controls", post(ui_controls))
        .route("/explain", post(explain))
        .route("/validate-code", post(validate_code))
        .route("/generate-code", post(generate_code))
        .route("/sandbox", post(sandbox))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn present_list(value: Option<TextOrList>) -> Option<TextOrList> {
    value.filter(|v| !v.is_blank())
}

/// First three words of the request, e.g. "Create a pendulum Simulation".
fn topic_for(user_input: &str) -> String {
    let words: Vec<&str> = user_input.split_whitespace().take(3).collect();
    format!("{} Simulation", words.join(" "))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        has_api_key: state.has_api_key,
    })
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let req = body(payload)?;
    let user_input = present(req.user_input).ok_or_else(|| AppError::missing("user_input"))?;
    let language = req.language.unwrap_or_default();

    let category = select_category(&user_input);
    info!(%category, %language, "generating simulation");

    let reference = state.references.load(category).await;
    debug!(%category, source = ?reference.source, "reference resolved");
    let prompt =
        prompt::simulation_prompt(&user_input, language, category.rule(), &reference.text);
    let html = state.text(prompt, prompt::SIMULATION_TEMPERATURE).await?;

    Ok(Json(GenerateResponse {
        success: true,
        simulation_html: strip_code_fence(&html),
        structured_data: StructuredData {
            topic: topic_for(&user_input),
            key_concepts: key_concepts(&user_input),
            user_level: DEFAULT_USER_LEVEL.to_string(),
            language,
        },
        features: FEATURES.iter().map(|s| s.to_string()).collect(),
        pipeline_steps: PIPELINE_STEPS.iter().map(|s| s.to_string()).collect(),
        language,
        reference_category: category,
    }))
}

async fn enhance_prompt(
    State(state): State<AppState>,
    payload: Result<Json<EnhancePromptRequest>, JsonRejection>,
) -> Result<Json<EnhancePromptResponse>, AppError> {
    let req = body(payload)?;
    let missing = |field: &str| AppError::BadRequest(format!("Missing required field: {field}"));

    let brief = SimulationBrief {
        topic: present(req.topic).ok_or_else(|| missing("topic"))?,
        key_concepts: present_list(req.key_concepts).ok_or_else(|| missing("key_concepts"))?,
        key_variables: present_list(req.key_variables).ok_or_else(|| missing("key_variables"))?,
        simulation_goals: present_list(req.simulation_goals)
            .ok_or_else(|| missing("simulation_goals"))?,
        user_level: present(req.user_level).ok_or_else(|| missing("user_level"))?,
    };

    info!(topic = %brief.topic, level = %brief.user_level, "enhancing prompt");
    let enhanced = state
        .text(prompt::enhance_prompt(&brief), prompt::ENHANCE_TEMPERATURE)
        .await?;

    Ok(Json(EnhancePromptResponse {
        enhanced_prompt: enhanced,
        structured_data: brief,
    }))
}

async fn ui_controls(
    State(state): State<AppState>,
    payload: Result<Json<UiControlsRequest>, JsonRejection>,
) -> Result<Json<UiControls>, AppError> {
    let req = body(payload)?;
    let (Some(key_variables), Some(simulation_goals), Some(user_level)) = (
        present_list(req.key_variables),
        present_list(req.simulation_goals),
        present(req.user_level),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields: key_variables, simulation_goals, user_level".to_string(),
        ));
    };

    let prompt = prompt::ui_controls_prompt(&key_variables, &simulation_goals, &user_level);
    state.gate().await?;
    let controls: UiControls =
        generate_object(state.llm.as_ref(), TextRequest::new(prompt), "ui_controls").await?;

    info!(controls = controls.ui_controls.len(), "generated ui controls");
    Ok(Json(controls))
}

async fn explain(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<ExplainResponse>, AppError> {
    let req = body(payload)?;
    let (Some(code), Some(topic), Some(key_concepts)) = (
        present(req.code),
        present(req.topic),
        present_list(req.key_concepts),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields: code, topic, key_concepts".to_string(),
        ));
    };

    let prompt = prompt::explain_prompt(&code, &topic, &key_concepts);
    state.gate().await?;
    let explanations: Explanations = generate_object(
        state.llm.as_ref(),
        TextRequest::new(prompt).with_temperature(prompt::EXPLAIN_TEMPERATURE),
        "explanations",
    )
    .await?;

    info!(
        explanations = explanations.explanations.len(),
        injections = explanations.code_injections.len(),
        "generated explanations"
    );
    Ok(Json(ExplainResponse {
        explanations,
        original_code: code,
        topic,
        key_concepts,
    }))
}

async fn validate_code(
    State(state): State<AppState>,
    payload: Result<Json<ValidateCodeRequest>, JsonRejection>,
) -> Result<Json<ValidateCodeResponse>, AppError> {
    let req = body(payload)?;
    let code = present(req.code).ok_or_else(|| AppError::missing("code"))?;

    let reply = state
        .text(prompt::validate_code_prompt(&code), prompt::VALIDATE_TEMPERATURE)
        .await?;

    let response = if is_validation_error(&reply) {
        info!("code rejected by validator");
        ValidateCodeResponse {
            code: None,
            error: Some(reply.trim().to_string()),
            original_code: code,
        }
    } else {
        ValidateCodeResponse {
            code: Some(strip_code_fence(&reply)),
            error: None,
            original_code: code,
        }
    };
    Ok(Json(response))
}

async fn generate_code(
    State(state): State<AppState>,
    payload: Result<Json<GenerateCodeRequest>, JsonRejection>,
) -> Result<Json<GenerateCodeResponse>, AppError> {
    let req = body(payload)?;
    let prompt_text = present(req.prompt_text).ok_or_else(|| AppError::missing("prompt_text"))?;

    let prompt = prompt::code_generation_prompt(
        &prompt_text,
        req.ui_controls.as_ref(),
        req.explanations.as_ref(),
    );
    let code = state.text(prompt, prompt::CODE_TEMPERATURE).await?;

    Ok(Json(GenerateCodeResponse {
        code: strip_code_fence(&code),
        prompt: prompt_text,
        ui_controls: req.ui_controls,
        explanations: req.explanations,
    }))
}

async fn sandbox(
    State(state): State<AppState>,
    payload: Result<Json<SandboxRequest>, JsonRejection>,
) -> Result<Json<SandboxResponse>, AppError> {
    let req = body(payload)?;
    let code =
        present(req.validated_code).ok_or_else(|| AppError::missing("validated_code"))?;
    let info = req.structured_data.unwrap_or_default();

    let concepts = info
        .key_concepts
        .as_ref()
        .filter(|c| !c.is_blank())
        .map(|c| c.items().join(", "))
        .unwrap_or_else(|| "physics".to_string());
    let prompt = prompt::sandbox_prompt(
        &code,
        info.topic.as_deref().unwrap_or("Physics Simulation"),
        info.user_level.as_deref().unwrap_or("beginner"),
        &concepts,
    );
    let optimized = strip_code_fence(&state.text(prompt, prompt::SANDBOX_TEMPERATURE).await?);
    let html_wrapper = sandbox_page(&optimized, &info, req.ui_controls.as_ref());

    Ok(Json(SandboxResponse {
        success: true,
        sandbox_code: optimized,
        html_wrapper,
        preview_ready: true,
        optimization_notes: SANDBOX_NOTES.iter().map(|s| s.to_string()).collect(),
    }))
}
