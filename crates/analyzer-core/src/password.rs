//! Rule-table password strength scoring.

/// Characters counted as "special".
pub const SPECIALS: &str = "!@#$%^&*()-_=+[]{}|;:',.<>/?`~\\\"";

const MIN_LENGTH: usize = 8;
const STRONG_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "WEAK",
            Self::Medium => "MEDIUM",
            Self::Strong => "STRONG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordVerdict {
    pub strength: Strength,
    /// One line per unmet requirement; empty for `Strong`.
    pub feedback: Vec<String>,
}

struct Rule {
    passes: fn(&str) -> bool,
    advice: &'static str,
}

/// Character-class rules; the length rule is checked separately.
const CLASS_RULES: &[Rule] = &[
    Rule {
        passes: |p: &str| p.chars().any(char::is_uppercase),
        advice: "Add at least one uppercase letter (A-Z).",
    },
    Rule {
        passes: |p: &str| p.chars().any(char::is_lowercase),
        advice: "Add at least one lowercase letter (a-z).",
    },
    Rule {
        passes: |p: &str| p.chars().any(|c| c.is_ascii_digit()),
        advice: "Add at least one number (0-9).",
    },
    Rule {
        passes: |p: &str| p.chars().any(|c| SPECIALS.contains(c)),
        advice: "Add at least one special character (e.g., !@#$%^&*).",
    },
];

pub fn check_password_strength(password: &str) -> PasswordVerdict {
    let length = password.chars().count();
    let mut feedback = Vec::new();

    if length < MIN_LENGTH {
        feedback.push(format!("Make it at least {MIN_LENGTH} characters long."));
    }

    let mut classes_met = 0;
    for rule in CLASS_RULES {
        if (rule.passes)(password) {
            classes_met += 1;
        } else {
            feedback.push(rule.advice.to_string());
        }
    }

    let strength = if length >= STRONG_LENGTH && classes_met == CLASS_RULES.len() {
        feedback.clear();
        Strength::Strong
    } else if length >= MIN_LENGTH && classes_met >= 3 {
        Strength::Medium
    } else {
        Strength::Weak
    };

    PasswordVerdict { strength, feedback }
}
