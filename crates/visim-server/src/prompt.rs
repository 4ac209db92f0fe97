/// Prompt templates for every generation endpoint.
///
/// All functions are pure string assembly; request validation happens in the
/// handlers before any of these are called.
use crate::category::CategoryRule;
use crate::model::{Language, SimulationBrief, TextOrList};

pub const SIMULATION_TEMPERATURE: f32 = 0.3;
pub const ENHANCE_TEMPERATURE: f32 = 0.2;
pub const EXPLAIN_TEMPERATURE: f32 = 0.3;
pub const VALIDATE_TEMPERATURE: f32 = 0.0;
pub const CODE_TEMPERATURE: f32 = 0.4;
pub const SANDBOX_TEMPERATURE: f32 = 0.2;

const ENCODING_RULES: &str = "\
ENCODING REQUIREMENTS:
1. Never emit raw Unicode emoji; they break when the page is saved with a different encoding.
2. Use HTML entities instead:
   - play / pause: &#9654; and &#9208;
   - reset: &#8635;
   - settings or controls: &#9881;
   - info: &#8505;
   - sums and integrals: &sum; &int;
   - Greek letters: &alpha; &beta; &gamma; &theta; &pi; &omega;
3. Always declare <meta charset=\"UTF-8\">.
4. Section labels may use plain words (\"Controls\", \"Data\", \"Equations\") instead of icons.";

const BUILD_REQUIREMENTS: &str = "\
TECHNICAL REQUIREMENTS:
1. One complete, standalone HTML file with embedded CSS and JavaScript.
2. Accurate physics calculations updated in real time with proper numerical integration.
3. Interactive controls (sliders, buttons) for the key parameters, with realistic ranges.
4. Live readouts of the important physical quantities, with units.
5. Pause/play and reset controls.
6. Responsive layout that works in current browsers.

EDUCATIONAL REQUIREMENTS:
- Explain the physics concepts on the page, including the governing equations.
- Show vector components and forces visually where they apply.
- Demonstrate energy conservation where applicable.

VISUAL REQUIREMENTS:
- Professional gradient backgrounds using the signature purple scheme (#7962A6 to #A796CB).
- Clear, readable fonts and layout; smooth animation.
- Colour-code distinct physics quantities and give interactive visual feedback.";

const INDONESIAN_RULES: &str = "\
LANGUAGE REQUIREMENTS:
- All text, labels and descriptions must be in Bahasa Indonesia.
- Use Indonesian scientific terminology for physics terms.
- Keep equations in standard mathematical notation.
- Translate every UI element.";

/// Prompt for `/generate`. Always contains `user_input` verbatim and the
/// language tag.
pub fn simulation_prompt(
    user_input: &str,
    language: Language,
    rule: &CategoryRule,
    reference: &str,
) -> String {
    let lang = language.as_str();
    let concepts = rule.concepts.join(", ");
    let language_rules = match language {
        Language::Id => INDONESIAN_RULES,
        Language::En => "",
    };

    let reference_block = if reference.trim().is_empty() {
        String::new()
    } else {
        format!(
            "REFERENCE CODE (for inspiration only, do not copy):\n\
{reference}\n\n\
The reference shows one way to structure markup, styling, physics updates and \
controls. Create an original simulation for the request above; do not reproduce \
the reference.\n"
        )
    };

    format!(
        "You are an expert physics simulation developer. Create a complete, interactive \
HTML physics simulation based on the user's request.

User Request: {user_input}
Language: {lang}
Reference Category: {category}
Key Concepts: {concepts}

{reference_block}
{ENCODING_RULES}

{BUILD_REQUIREMENTS}

The document MUST start with:
<!DOCTYPE html>
<html lang=\"{lang}\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">

{language_rules}

Output only the complete HTML document, with no explanations and no markdown formatting.",
        category = rule.category,
    )
}

pub fn enhance_prompt(brief: &SimulationBrief) -> String {
    let level = &brief.user_level;
    format!(
        "Create a comprehensive, detailed prompt for generating a {level}-friendly \
educational physics simulation.

Topic: {topic}
Physics concepts: {concepts}
Key variables: {variables}
Simulation goals: {goals}
User Level: {level}

Generate a comprehensive prompt that covers:

1. Technical implementation: p5.js or matter.js functions to use, canvas setup, \
physics formulas, animation and interaction patterns.
2. Educational requirements: learning objectives for {level} students, concepts to \
highlight visually, common misconceptions, real-world connections.
3. Interactive elements: sliders, buttons and checkboxes, real-time value displays, \
reset and control functionality.
4. Visual design: colour coding per concept, labelling and annotations, graphs, layout.
5. Physics accuracy: precision, units, edge cases, realistic parameter ranges.
6. User experience: control placement, instructions, progressive disclosure, accessibility.

The enhanced prompt must be detailed enough for a developer to implement the \
simulation without further clarification.",
        topic = brief.topic,
        concepts = brief.key_concepts,
        variables = brief.key_variables,
        goals = brief.simulation_goals,
    )
}

pub fn ui_controls_prompt(
    key_variables: &TextOrList,
    simulation_goals: &TextOrList,
    user_level: &str,
) -> String {
    format!(
        "Generate p5.js UI controls for a physics simulation.

Key Variables: {key_variables}
Simulation Goals: {simulation_goals}
User Level: {user_level}

Create appropriate controls:
- Sliders for numeric values with proper ranges
- Checkboxes for boolean toggles
- Buttons for actions (reset, start/stop)
- Positions around the canvas edges
- Clear labels and descriptions
- Complexity appropriate for the {user_level} level

Provide setup_code (createSlider, createButton calls) and draw_code (reading the values)."
    )
}

pub fn explain_prompt(code: &str, topic: &str, key_concepts: &TextOrList) -> String {
    format!(
        "You are an educational physics simulation expert. Analyze this p5.js code and \
generate educational explanations and annotations.

Topic: {topic}
Key Physics Concepts: {key_concepts}

```javascript
{code}
```

Requirements:
- Explain the key physics concepts visible in the code
- Add tooltips for interactive elements (sliders, buttons, controls)
- Include real-time value displays for important physics variables
- Explain energy transformations, forces and motion where present
- Be scientifically accurate but accessible
- Position explanations near the relevant visuals using x, y coordinates
- Use JavaScript conditions to show explanations at the right moments
- Add code injections (setup, draw or class) for graphs, readouts and labels

Good examples: \"Kinetic Energy = 1/2 mv^2\" with a live value; \"As the pendulum swings, \
potential energy converts to kinetic energy\"; a velocity arrow showing direction and magnitude."
    )
}

/// Replies starting with this marker are treated as unfixable code.
pub const VALIDATION_ERROR_MARKER: &str = "ERROR:";

pub fn validate_code_prompt(code: &str) -> String {
    format!(
        "You are a code validator for educational JavaScript simulations using p5.js.

Validate and fix this code:

```javascript
{code}
```

Your job:
1. Detect syntax errors or missing structure (setup(), draw() functions)
2. Fix common issues (undeclared variables, missing canvas, typos)
3. Ensure the code is safe (no eval(), innerHTML or other dangerous functions)
4. Verify the p5.js structure and that interactive controls work
5. Fix bugs that would prevent the simulation from running

Respond with either the corrected JavaScript code, or a clear error message starting \
with \"{VALIDATION_ERROR_MARKER}\" if the code cannot be fixed.

Output ONLY code or the error message, no explanations."
    )
}

pub fn code_generation_prompt(
    prompt_text: &str,
    ui_controls: Option<&serde_json::Value>,
    explanations: Option<&serde_json::Value>,
) -> String {
    let controls = ui_controls
        .map(pretty_json)
        .unwrap_or_else(|| "No UI controls provided".to_string());
    let explanations = explanations
        .map(pretty_json)
        .unwrap_or_else(|| "No explanations provided".to_string());

    format!(
        "You are a JavaScript simulation expert using the p5.js and matter.js libraries.

Write clean, beginner-friendly code based on:

{prompt_text}

UI Controls to integrate:
{controls}

Educational explanations to add:
{explanations}

Requirements:
- Choose p5.js for simple graphics or matter.js for complex physics
- Comment the physics concepts
- Use only p5.js and/or matter.js
- Use proper setup() and draw() functions
- Integrate ALL provided UI controls
- Add ALL educational explanations as text overlays
- Include a reset button and error handling
- Use colour coding and labels

Respond ONLY with complete JavaScript code."
    )
}

pub fn sandbox_prompt(code: &str, topic: &str, user_level: &str, concepts: &str) -> String {
    format!(
        "You are a sandbox code optimizer for physics simulations.

Optimize this p5.js physics simulation for real-time preview in a web sandbox:

```javascript
{code}
```

Simulation Info:
- Topic: {topic}
- Level: {user_level}
- Concepts: {concepts}

Requirements:
1. Canvas no larger than 600x400
2. Error handling that prevents crashes
3. Smooth real-time rendering
4. Clear visual feedback and labels
5. Functional, responsive controls
6. A pause/play button
7. An FPS display
8. Bounds checking so objects stay on screen
9. Consistent colours and typography
10. Keyboard shortcuts: spacebar to pause, 'r' to reset

Also display key physics values live, draw force/velocity/energy indicators, \
label units, and show the relevant equations.

Output ONLY the complete optimized JavaScript code."
    )
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
