//! Mapping native type signatures onto property kinds
//!
//! The rule table is ordered: exact scalar names first, then the math types,
//! then object pointers, then enums. A signature no rule claims is reported
//! rather than guessed at. Bump `RULES_VERSION` whenever a rule changes.

/// Revision of the classification rule table.
pub const RULES_VERSION: u32 = 1;

/// Result of classifying one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Rotation,
    FileReference,
    InstanceReference,
    ObjectPointer { target: String },
    Enum { name: String },
    Unrecognized,
}

#[derive(Debug, Clone, Copy)]
enum Fixed {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Rotation,
    FileReference,
    InstanceReference,
}

impl From<Fixed> for Classification {
    fn from(fixed: Fixed) -> Self {
        match fixed {
            Fixed::Float => Classification::Float,
            Fixed::Vec2 => Classification::Vec2,
            Fixed::Vec3 => Classification::Vec3,
            Fixed::Vec4 => Classification::Vec4,
            Fixed::Rotation => Classification::Rotation,
            Fixed::FileReference => Classification::FileReference,
            Fixed::InstanceReference => Classification::InstanceReference,
        }
    }
}

const EXACT_RULES: &[(&str, Fixed)] = &[
    ("float", Fixed::Float),
    ("class Sailor::FileId", Fixed::FileReference),
    ("class Sailor::InstanceId", Fixed::InstanceReference),
    ("struct glm::vec<2,float,0>", Fixed::Vec2),
    ("struct glm::vec<3,float,0>", Fixed::Vec3),
    ("struct glm::vec<4,float,0>", Fixed::Vec4),
    ("struct glm::qua<float,0>", Fixed::Rotation),
];

const POINTER_MARKER: &str = "TObjectPtr<";
const ENUM_PREFIX: &str = "enum ";

pub fn classify(signature: &str) -> Classification {
    let normalized = normalize(signature);

    if let Some((_, fixed)) = EXACT_RULES.iter().find(|(rule, _)| *rule == normalized) {
        return (*fixed).into();
    }

    if let Some(start) = normalized.find(POINTER_MARKER) {
        let inner = &normalized[start + POINTER_MARKER.len()..];
        let inner = inner.strip_suffix('>').unwrap_or(inner);
        let target = strip_type_keyword(inner);
        if !target.is_empty() {
            return Classification::ObjectPointer {
                target: target.to_string(),
            };
        }
        return Classification::Unrecognized;
    }

    if let Some(rest) = normalized.strip_prefix(ENUM_PREFIX) {
        let name = strip_type_keyword(rest);
        if !name.is_empty() && !name.contains(char::is_whitespace) {
            return Classification::Enum {
                name: name.to_string(),
            };
        }
    }

    Classification::Unrecognized
}

/// Collapse whitespace runs and drop whitespace around `<`, `>` and `,`.
fn normalize(signature: &str) -> String {
    let collapsed = signature.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            let before_punct = matches!(chars.peek(), Some('<') | Some('>') | Some(','));
            let after_punct = out.ends_with(|p: char| matches!(p, '<' | '>' | ','));
            if before_punct || after_punct {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn strip_type_keyword(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("class ")
        .or_else(|| name.strip_prefix("struct "))
        .unwrap_or(name)
        .trim()
}
