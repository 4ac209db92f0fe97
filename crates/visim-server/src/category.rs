/// Physics topic categories and the keyword rules that select them.
///
/// Rules are checked in `RULES` order and the first rule with a matching keyword
/// wins. Nothing matching falls through to [`Category::DEFAULT`].
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Pendulum,
    Projectile,
    Spring,
    Collision,
    Moments,
    Light,
    Waves,
    DoubleSlit,
}

impl Category {
    pub const DEFAULT: Category = Category::Pendulum;

    pub const ALL: [Category; 8] = [
        Category::Pendulum,
        Category::Projectile,
        Category::Spring,
        Category::Collision,
        Category::Moments,
        Category::Light,
        Category::Waves,
        Category::DoubleSlit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pendulum => "pendulum",
            Category::Projectile => "projectile",
            Category::Spring => "spring",
            Category::Collision => "collision",
            Category::Moments => "moments",
            Category::Light => "light",
            Category::Waves => "waves",
            Category::DoubleSlit => "doubleSlit",
        }
    }

    pub fn rule(self) -> &'static CategoryRule {
        match self {
            Category::Pendulum => &PENDULUM,
            Category::Projectile => &PROJECTILE,
            Category::Spring => &SPRING,
            Category::Collision => &COLLISION,
            Category::Moments => &MOMENTS,
            Category::Light => &LIGHT,
            Category::Waves => &WAVES,
            Category::DoubleSlit => &DOUBLE_SLIT,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword test against lower-cased input.
#[derive(Debug)]
pub enum Keyword {
    /// Matches when the substring occurs anywhere.
    Substr(&'static str),
    /// Matches when every substring occurs, in any order.
    AllOf(&'static [&'static str]),
}

impl Keyword {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            Keyword::Substr(s) => haystack.contains(*s),
            Keyword::AllOf(parts) => parts.iter().all(|p| haystack.contains(*p)),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Substr(s) => f.write_str(s),
            Keyword::AllOf(parts) => f.write_str(&parts.join("+")),
        }
    }
}

#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [Keyword],
    /// File name looked up in each reference directory.
    pub file_name: &'static str,
    /// Copy compiled into the binary, used when no directory has the file.
    pub embedded: &'static str,
    pub concepts: &'static [&'static str],
}

use Keyword::{AllOf, Substr};

static PENDULUM: CategoryRule = CategoryRule {
    category: Category::Pendulum,
    keywords: &[
        Substr("pendulum"),
        Substr("swing"),
        Substr("oscillat"),
        Substr("harmonic"),
        Substr("period"),
        Substr("bob"),
    ],
    file_name: "pendulum.html",
    embedded: include_str!("../references/pendulum.html"),
    concepts: &[
        "Simple Harmonic Motion",
        "Period",
        "Oscillation",
        "Energy Conservation",
    ],
};

static PROJECTILE: CategoryRule = CategoryRule {
    category: Category::Projectile,
    keywords: &[
        Substr("projectile"),
        Substr("trajectory"),
        Substr("launch"),
        Substr("cannon"),
        Substr("ballistic"),
        Substr("parabola"),
        Substr("throw"),
        Substr("shoot"),
    ],
    file_name: "projectile.html",
    embedded: include_str!("../references/projectile.html"),
    concepts: &["Projectile Motion", "Trajectory", "Range", "Vector Physics"],
};

static SPRING: CategoryRule = CategoryRule {
    category: Category::Spring,
    keywords: &[
        Substr("spring"),
        Substr("oscillat"),
        Substr("hooke"),
        Substr("elastic"),
        Substr("vibrat"),
        Substr("simple harmonic"),
        Substr("shm"),
    ],
    file_name: "spring.html",
    embedded: include_str!("../references/spring.html"),
    concepts: &[
        "Hooke's Law",
        "Simple Harmonic Motion",
        "Elastic Force",
        "Energy Conservation",
    ],
};

static COLLISION: CategoryRule = CategoryRule {
    category: Category::Collision,
    keywords: &[
        Substr("collision"),
        Substr("momentum"),
        Substr("impact"),
        Substr("crash"),
        Substr("inelastic"),
        Substr("restitution"),
        Substr("billiard"),
        AllOf(&["ball", "hit"]),
    ],
    file_name: "collision.html",
    embedded: include_str!("../references/collision.html"),
    concepts: &[
        "Momentum Conservation",
        "Elastic Collision",
        "Coefficient of Restitution",
        "Kinetic Energy",
    ],
};

static MOMENTS: CategoryRule = CategoryRule {
    category: Category::Moments,
    keywords: &[
        Substr("moment"),
        Substr("torque"),
        Substr("lever"),
        Substr("balance"),
        Substr("pivot"),
        Substr("beam"),
        Substr("seesaw"),
        Substr("rotation"),
        Substr("angular"),
    ],
    file_name: "moments.html",
    embedded: include_str!("../references/moments.html"),
    concepts: &[
        "Torque",
        "Rotational Dynamics",
        "Equilibrium",
        "Angular Motion",
    ],
};

static LIGHT: CategoryRule = CategoryRule {
    category: Category::Light,
    keywords: &[
        Substr("light"),
        Substr("optic"),
        Substr("reflect"),
        Substr("refract"),
        Substr("mirror"),
        Substr("lens"),
    ],
    file_name: "light-reflection.html",
    embedded: include_str!("../references/light-reflection.html"),
    concepts: &["Reflection", "Refraction", "Optics", "Light Physics"],
};

static DOUBLE_SLIT: CategoryRule = CategoryRule {
    category: Category::DoubleSlit,
    keywords: &[
        AllOf(&["double", "slit"]),
        Substr("quantum"),
        Substr("particle wave"),
        Substr("wave-particle"),
    ],
    file_name: "double-slit.html",
    embedded: include_str!("../references/double-slit.html"),
    concepts: &[
        "Wave-Particle Duality",
        "Quantum Physics",
        "Interference Pattern",
    ],
};

static WAVES: CategoryRule = CategoryRule {
    category: Category::Waves,
    keywords: &[
        Substr("wave"),
        Substr("interferen"),
        Substr("diffraction"),
        Substr("frequency"),
        Substr("amplitude"),
        Substr("slit"),
    ],
    file_name: "wave-interference.html",
    embedded: include_str!("../references/wave-interference.html"),
    concepts: &[
        "Wave Interference",
        "Diffraction",
        "Superposition",
        "Wave Physics",
    ],
};

/// Priority order. Double slit is checked before the generic wave rule,
/// otherwise "slit" would always land on waves.
pub static RULES: [&CategoryRule; 8] = [
    &PENDULUM,
    &PROJECTILE,
    &SPRING,
    &COLLISION,
    &MOMENTS,
    &LIGHT,
    &DOUBLE_SLIT,
    &WAVES,
];

#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub category: Category,
    /// Keyword that fired; `None` when the default was used.
    pub keyword: Option<&'static Keyword>,
}

pub fn select_match(input: &str) -> Selection {
    let lowered = input.to_lowercase();
    for rule in RULES {
        if let Some(keyword) = rule.keywords.iter().find(|k| k.matches(&lowered)) {
            return Selection {
                category: rule.category,
                keyword: Some(keyword),
            };
        }
    }
    Selection {
        category: Category::DEFAULT,
        keyword: None,
    }
}

/// First matching category in priority order, or [`Category::DEFAULT`].
pub fn select_category(input: &str) -> Category {
    let selection = select_match(input);
    match selection.keyword {
        Some(keyword) => debug!(category = %selection.category, %keyword, "category matched"),
        None => debug!(category = %selection.category, "no keyword matched, using default"),
    }
    selection.category
}

/// Keyword → concept table used to label a request. Independent of category
/// selection: one request can pick up concepts from several rows.
const CONCEPT_MAP: &[(&str, &[&str])] = &[
    ("energy", &["Energy Conservation", "Kinetic Energy", "Potential Energy"]),
    ("force", &["Force", "Newton's Laws", "Acceleration"]),
    ("motion", &["Kinematics", "Velocity", "Acceleration"]),
    ("wave", &["Wave Interference", "Diffraction", "Superposition"]),
    ("light", &["Reflection", "Refraction", "Optics"]),
    ("pendulum", &["Simple Harmonic Motion", "Period", "Oscillation"]),
    ("projectile", &["Projectile Motion", "Trajectory", "Range"]),
    ("moment", &["Torque", "Rotational Dynamics", "Equilibrium"]),
    (
        "collision",
        &["Momentum Conservation", "Elastic Collision", "Coefficient of Restitution"],
    ),
    ("spring", &["Hooke's Law", "Simple Harmonic Motion", "Elastic Force"]),
];

const GENERIC_CONCEPTS: &[&str] = &[
    "Physics Simulation",
    "Interactive Learning",
    "Scientific Visualization",
];

/// Concepts mentioned by `input`, deduplicated in first-seen order.
pub fn key_concepts(input: &str) -> Vec<String> {
    let lowered = input.to_lowercase();
    let mut concepts: Vec<String> = Vec::new();
    for (keyword, related) in CONCEPT_MAP {
        if !lowered.contains(keyword) {
            continue;
        }
        for concept in related.iter() {
            if !concepts.iter().any(|c| c == concept) {
                concepts.push(concept.to_string());
            }
        }
    }
    if concepts.is_empty() {
        concepts = GENERIC_CONCEPTS.iter().map(|c| c.to_string()).collect();
    }
    concepts
}
