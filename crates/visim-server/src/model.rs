use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Spoken language of the generated simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field callers send either as one string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    pub fn is_blank(&self) -> bool {
        match self {
            TextOrList::Text(s) => s.trim().is_empty(),
            TextOrList::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Non-blank entries; a single string counts as one entry.
    pub fn items(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            TextOrList::Text(s) => vec![s.as_str()],
            TextOrList::List(items) => items.iter().map(String::as_str).collect(),
        };
        all.into_iter().filter(|s| !s.trim().is_empty()).collect()
    }
}

impl fmt::Display for TextOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrList::Text(s) => f.write_str(s),
            TextOrList::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub has_api_key: bool,
}

// --- /generate ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub user_input: Option<String>,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    pub topic: String,
    pub key_concepts: Vec<String>,
    pub user_level: String,
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub simulation_html: String,
    pub structured_data: StructuredData,
    pub features: Vec<String>,
    pub pipeline_steps: Vec<String>,
    pub language: Language,
    pub reference_category: Category,
}

// --- /enhance-prompt ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnhancePromptRequest {
    pub topic: Option<String>,
    pub key_concepts: Option<TextOrList>,
    pub key_variables: Option<TextOrList>,
    pub simulation_goals: Option<TextOrList>,
    pub user_level: Option<String>,
}

/// Validated `/enhance-prompt` input.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationBrief {
    pub topic: String,
    pub key_concepts: TextOrList,
    pub key_variables: TextOrList,
    pub simulation_goals: TextOrList,
    pub user_level: String,
}

#[derive(Debug, Serialize)]
pub struct EnhancePromptResponse {
    pub enhanced_prompt: String,
    pub structured_data: SimulationBrief,
}

// --- /ui-controls ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UiControlsRequest {
    pub key_variables: Option<TextOrList>,
    pub simulation_goals: Option<TextOrList>,
    pub user_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UiControls {
    pub ui_controls: Vec<UiControl>,
    pub setup_code: String,
    pub draw_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UiControl {
    pub name: String,
    #[serde(rename = "type")]
    pub control_type: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub default: ControlValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub position: Position,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ControlValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// --- /explain ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExplainRequest {
    pub code: Option<String>,
    pub topic: Option<String>,
    pub key_concepts: Option<TextOrList>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Explanations {
    pub explanations: Vec<Explanation>,
    pub code_injections: Vec<CodeInjection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Explanation {
    pub location: Location,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "type")]
    pub kind: ExplanationKind,
}

/// Canvas coordinates; either literal numbers or p5.js expressions such as `width / 2`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub x: Coordinate,
    pub y: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Expr(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationKind {
    Tooltip,
    Annotation,
    Label,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodeInjection {
    pub location: InjectionPoint,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InjectionPoint {
    Setup,
    Draw,
    Class,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    #[serde(flatten)]
    pub explanations: Explanations,
    pub original_code: String,
    pub topic: String,
    pub key_concepts: TextOrList,
}

// --- /validate-code ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidateCodeRequest {
    pub code: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ValidateCodeResponse {
    pub code: Option<String>,
    pub error: Option<String>,
    pub original_code: String,
}

// --- /generate-code ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateCodeRequest {
    pub prompt_text: Option<String>,
    pub ui_controls: Option<serde_json::Value>,
    pub explanations: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCodeResponse {
    pub code: String,
    pub prompt: String,
    pub ui_controls: Option<serde_json::Value>,
    pub explanations: Option<serde_json::Value>,
}

// --- /sandbox ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SandboxRequest {
    pub validated_code: Option<String>,
    pub structured_data: Option<SandboxInfo>,
    pub ui_controls: Option<SandboxControls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SandboxInfo {
    pub topic: Option<String>,
    pub user_level: Option<String>,
    pub key_concepts: Option<TextOrList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SandboxControls {
    pub ui_controls: Vec<ControlLabel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlLabel {
    pub name: Option<String>,
    pub label: Option<String>,
}

impl ControlLabel {
    pub fn display_name(&self) -> Option<&str> {
        self.label
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.name.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct SandboxResponse {
    pub success: bool,
    pub sandbox_code: String,
    pub html_wrapper: String,
    pub preview_ready: bool,
    pub optimization_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_or_list_accepts_both_shapes() {
        let one: TextOrList = serde_json::from_str(r#""velocity""#).unwrap();
        let many: TextOrList = serde_json::from_str(r#"["mass", "length"]"#).unwrap();
        assert_eq!(one.to_string(), "velocity");
        assert_eq!(many.to_string(), "mass, length");
        assert!(TextOrList::List(vec![" ".to_string()]).is_blank());
        assert!(!many.is_blank());
    }

    #[test]
    fn text_or_list_items_skip_blanks() {
        let text: TextOrList = serde_json::from_str(r#""Torque""#).unwrap();
        assert_eq!(text.items(), vec!["Torque"]);

        let list: TextOrList = serde_json::from_str(r#"["Torque", " ", "Equilibrium"]"#).unwrap();
        assert_eq!(list.items(), vec!["Torque", "Equilibrium"]);

        let info: SandboxInfo =
            serde_json::from_str(r#"{"topic": "Seesaw", "key_concepts": "Torque"}"#).unwrap();
        assert_eq!(info.key_concepts.map(|c| c.is_blank()), Some(false));
    }

    #[test]
    fn generate_request_tolerates_missing_fields() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_input.is_none());
        assert!(req.language.is_none());

        let req: GenerateRequest =
            serde_json::from_str(r#"{"user_input":"x","language":"id"}"#).unwrap();
        assert_eq!(req.language, Some(Language::Id));
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!(serde_json::from_str::<GenerateRequest>(r#"{"language":"fr"}"#).is_err());
    }

    #[test]
    fn ui_control_default_keeps_its_json_type() {
        let raw = r#"{
            "name": "gravity", "type": "slider", "label": "Gravity",
            "min": 1, "max": 20, "default": 9.8, "step": 0.1,
            "position": {"x": 10, "y": 420}, "description": "g in m/s^2"
        }"#;
        let control: UiControl = serde_json::from_str(raw).unwrap();
        assert_eq!(control.default, ControlValue::Number(9.8));
        assert_eq!(control.control_type, "slider");

        let toggle: ControlValue = serde_json::from_str("true").unwrap();
        assert_eq!(toggle, ControlValue::Bool(true));
        let text: ControlValue = serde_json::from_str(r#""on""#).unwrap();
        assert_eq!(text, ControlValue::Text("on".to_string()));
    }

    #[test]
    fn explanation_rejects_unknown_kind() {
        let ok = r#"{"location":{"x":"width/2","y":40},"text":"KE = 1/2 mv^2","type":"label"}"#;
        let parsed: Explanation = serde_json::from_str(ok).unwrap();
        assert_eq!(parsed.kind, ExplanationKind::Label);
        assert_eq!(parsed.location.x, Coordinate::Expr("width/2".to_string()));
        assert_eq!(parsed.location.y, Coordinate::Number(40.0));

        let bad = ok.replace("\"label\"", "\"popup\"");
        assert!(serde_json::from_str::<Explanation>(&bad).is_err());
    }

    #[test]
    fn explain_response_flattens_structured_fields() {
        let response = ExplainResponse {
            explanations: Explanations {
                explanations: vec![],
                code_injections: vec![CodeInjection {
                    location: InjectionPoint::Draw,
                    code: "text(ke, 10, 10);".to_string(),
                    description: "kinetic energy readout".to_string(),
                }],
            },
            original_code: "function setup() {}".to_string(),
            topic: "Pendulum".to_string(),
            key_concepts: TextOrList::Text("Energy".to_string()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["explanations"].is_array());
        assert_eq!(value["code_injections"][0]["location"], "draw");
        assert_eq!(value["topic"], "Pendulum");
    }

    #[test]
    fn control_label_prefers_label_then_name() {
        let both = ControlLabel {
            name: Some("g".to_string()),
            label: Some("Gravity".to_string()),
        };
        let name_only = ControlLabel {
            name: Some("g".to_string()),
            label: Some("".to_string()),
        };
        assert_eq!(both.display_name(), Some("Gravity"));
        assert_eq!(name_only.display_name(), Some("g"));
        assert_eq!(ControlLabel::default().display_name(), None);
    }
}
