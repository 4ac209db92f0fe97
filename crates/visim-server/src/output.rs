/// Post-processing of model output before it is relayed to the caller.
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{SandboxControls, SandboxInfo};
use crate::prompt::VALIDATION_ERROR_MARKER;

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("valid regex")
});

static SCRIPT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("valid regex"));

/// Drop a Markdown code fence wrapped around the whole reply, if there is one.
pub fn strip_code_fence(text: &str) -> String {
    match FENCED.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// The validator signals unfixable code with a leading marker.
pub fn is_validation_error(reply: &str) -> bool {
    let reply = reply.trim_start();
    reply.starts_with(VALIDATION_ERROR_MARKER) || reply.starts_with('\u{274C}')
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub const SANDBOX_NOTES: [&str; 5] = [
    "Canvas optimized for preview size",
    "Error handling added",
    "Performance monitoring included",
    "Keyboard controls enabled",
    "Real-time value displays added",
];

const SANDBOX_STYLE: &str = r#"        body {
            margin: 0;
            padding: 20px;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: linear-gradient(135deg, #A796CB20 0%, #7962A620 100%);
            color: #333;
        }
        .sandbox-container {
            background: rgba(255, 255, 255, 0.95);
            border-radius: 15px;
            padding: 20px;
            box-shadow: 0 8px 32px rgba(121, 98, 166, 0.2);
            border: 1px solid rgba(167, 150, 203, 0.3);
        }
        .simulation-header { text-align: center; margin-bottom: 20px; }
        .simulation-title { font-size: 24px; font-weight: bold; color: #7962A6; margin-bottom: 8px; }
        .simulation-info { font-size: 14px; color: #7962A6; margin-bottom: 15px; }
        .concepts-tags { display: flex; flex-wrap: wrap; justify-content: center; gap: 8px; }
        .concept-tag {
            padding: 4px 12px;
            border-radius: 20px;
            font-size: 12px;
            border: 1px solid #A796CB;
            color: #7962A6;
        }
        .canvas-container { display: flex; justify-content: center; margin: 20px 0; }
        .controls-info {
            padding: 15px;
            border-radius: 10px;
            font-size: 14px;
            line-height: 1.6;
            border: 1px solid #A796CB30;
        }
        .controls-title { font-weight: bold; margin-bottom: 8px; color: #7962A6; }
        .error-message {
            border: 1px solid rgba(255, 0, 0, 0.3);
            padding: 15px;
            border-radius: 10px;
            font-family: monospace;
            color: #dc3545;
        }"#;

const SANDBOX_ERROR_SCRIPT: &str = r#"        function showSimulationError(title, message) {
            const container = document.getElementById('canvas-container');
            const box = document.createElement('div');
            box.className = 'error-message';
            box.textContent = title + ': ' + message;
            container.replaceChildren(box);
        }
        window.addEventListener('error', function (e) {
            showSimulationError('Simulation error', e.message);
        });"#;

/// Wrap optimized p5.js code in a preview page. Caller-supplied text is
/// escaped; the code is only guarded against closing its own script tag.
pub fn sandbox_page(code: &str, info: &SandboxInfo, controls: Option<&SandboxControls>) -> String {
    let topic = escape_html(info.topic.as_deref().unwrap_or("Physics Simulation"));
    let level = escape_html(info.user_level.as_deref().unwrap_or("beginner"));

    let concepts = info
        .key_concepts
        .as_ref()
        .map(|c| c.items())
        .unwrap_or_default();
    let concept_tags = match concepts.as_slice() {
        [] => String::new(),
        concepts => {
            let tags: String = concepts
                .iter()
                .map(|c| format!("<span class=\"concept-tag\">{}</span>", escape_html(c)))
                .collect();
            format!("<div class=\"concepts-tags\">{tags}</div>")
        }
    };

    let control_names: Vec<String> = controls
        .map(|c| {
            c.ui_controls
                .iter()
                .filter_map(|control| control.display_name())
                .map(escape_html)
                .collect()
        })
        .unwrap_or_default();
    let control_line = if control_names.is_empty() {
        String::new()
    } else {
        format!(
            "&bull; <strong>Sliders &amp; Buttons:</strong> Adjust {}<br>",
            control_names.join(", ")
        )
    };

    let script = SCRIPT_CLOSE.replace_all(code, "<\\/$1");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{topic} - Sandbox Preview</title>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/p5.js/1.7.0/p5.min.js"></script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/matter-js/0.19.0/matter.min.js"></script>
    <style>
{SANDBOX_STYLE}
    </style>
</head>
<body>
    <div class="sandbox-container">
        <div class="simulation-header">
            <div class="simulation-title">{topic}</div>
            <div class="simulation-info">Level: {level} | Interactive Physics Sandbox</div>
            {concept_tags}
        </div>
        <div class="canvas-container" id="canvas-container"></div>
        <div class="controls-info">
            <div class="controls-title">Controls &amp; Information</div>
            <div>
                &bull; <strong>Spacebar:</strong> Pause/Resume simulation<br>
                &bull; <strong>R key:</strong> Reset simulation<br>
                &bull; <strong>Mouse:</strong> Interact with objects (drag, click)<br>
                {control_line}
                &bull; <strong>Real-time Values:</strong> Physics calculations displayed on canvas
            </div>
        </div>
    </div>
    <script>
{SANDBOX_ERROR_SCRIPT}
        try {{
{script}
        }} catch (error) {{
            showSimulationError('Initialization error', error.message);
        }}
    </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ControlLabel, TextOrList};

    #[test]
    fn strips_language_tagged_fence() {
        let reply = "```html\n<!DOCTYPE html>\n<html></html>\n```";
        assert_eq!(strip_code_fence(reply), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn strips_bare_fence_with_surrounding_whitespace() {
        let reply = "\n```\nfunction setup() {}\n```\n";
        assert_eq!(strip_code_fence(reply), "function setup() {}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        let reply = "<!DOCTYPE html><html></html>";
        assert_eq!(strip_code_fence(reply), reply);
        // A fence in the middle is content, not a wrapper.
        let mixed = "intro\n```js\nx\n```";
        assert_eq!(strip_code_fence(mixed), mixed);
    }

    #[test]
    fn detects_validation_errors() {
        assert!(is_validation_error("ERROR: missing draw()"));
        assert!(is_validation_error("  \u{274C} cannot fix"));
        assert!(!is_validation_error("function setup() { createCanvas(400, 400); }"));
        assert!(!is_validation_error("// ERROR: handled below\nfunction setup() {}"));
    }

    #[test]
    fn script_guard_ignores_tag_case() {
        let code = "let a = '</SCRIPT><img src=x onerror=alert(1)>'; let b = '</Script >';";
        let page = sandbox_page(code, &SandboxInfo::default(), None);
        assert!(!page.contains("</SCRIPT>"));
        assert!(!page.contains("</Script"));
        assert!(page.contains("<\\/SCRIPT><img"));
        assert!(page.contains("<\\/Script >"));
        assert_eq!(page.matches("</script>").count(), 3);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn sandbox_page_escapes_metadata_and_embeds_code() {
        let info = SandboxInfo {
            topic: Some("<script>alert(1)</script>".to_string()),
            user_level: Some("advanced".to_string()),
            key_concepts: Some(TextOrList::List(vec![
                "Torque".to_string(),
                "Equilibrium".to_string(),
            ])),
        };
        let controls = SandboxControls {
            ui_controls: vec![ControlLabel {
                name: Some("mass".to_string()),
                label: None,
            }],
        };
        let page = sandbox_page("function draw() {}", &info, Some(&controls));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt; - Sandbox Preview"));
        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains("Level: advanced"));
        assert!(page.contains("<span class=\"concept-tag\">Torque</span>"));
        assert!(page.contains("Adjust mass"));
        assert!(page.contains("function draw() {}"));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn sandbox_page_defaults_and_script_guard() {
        let page = sandbox_page("let s = '</script>';", &SandboxInfo::default(), None);
        assert!(page.contains("<title>Physics Simulation - Sandbox Preview</title>"));
        assert!(page.contains("Level: beginner"));
        assert!(!page.contains("concepts-tags\">"));
        assert!(!page.contains("Sliders &amp; Buttons"));
        assert!(page.contains("let s = '<\\/script>';"));
    }
}
