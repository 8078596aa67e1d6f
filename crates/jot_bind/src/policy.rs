use crate::descriptor::TypeDescriptor;

// -----------------------------------------------------------------------------
// NamingPolicy

/// Maps a declared member name to its serialized JSON name.
///
/// Applied only where no explicit `#[jot(rename = "..")]` is present; a
/// rename always wins.
#[derive(Clone, Default)]
pub enum NamingPolicy {
    /// Use the declared name as-is.
    #[default]
    Identity,
    /// `user_name` -> `username`-style lowercasing (separators removed).
    LowerCase,
    /// `user_name` -> `UserName`.
    UpperCamelCase,
    /// `userName` -> `user_name`.
    SnakeCase,
    /// `userName` -> `user-name`.
    KebabCase,
    /// Arbitrary mapping.
    Custom(fn(&str) -> String),
}

impl NamingPolicy {
    pub fn apply(&self, declared: &str) -> String {
        match self {
            Self::Identity => declared.to_string(),
            Self::LowerCase => declared
                .chars()
                .filter(|c| *c != '_' && *c != '-')
                .flat_map(char::to_lowercase)
                .collect(),
            Self::UpperCamelCase => {
                let mut out = String::with_capacity(declared.len());
                let mut upper_next = true;
                for c in declared.chars() {
                    if c == '_' || c == '-' {
                        upper_next = true;
                    } else if upper_next {
                        out.extend(c.to_uppercase());
                        upper_next = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            },
            Self::SnakeCase => separate(declared, '_'),
            Self::KebabCase => separate(declared, '-'),
            Self::Custom(f) => f(declared),
        }
    }
}

impl core::fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Identity => "Identity",
            Self::LowerCase => "LowerCase",
            Self::UpperCamelCase => "UpperCamelCase",
            Self::SnakeCase => "SnakeCase",
            Self::KebabCase => "KebabCase",
            Self::Custom(_) => "Custom(..)",
        };
        f.write_str(name)
    }
}

/// Lower-cases and re-separates word boundaries with `sep`.
fn separate(declared: &str, sep: char) -> String {
    let mut out = String::with_capacity(declared.len() + 4);
    let mut prev_lower = false;
    for c in declared.chars() {
        if c == '_' || c == '-' {
            out.push(sep);
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push(sep);
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Direction

/// The two halves of a codec; exclusion is decided per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Serialize,
    Deserialize,
}

// -----------------------------------------------------------------------------
// ExclusionStrategy

/// Bind-time view of one member, as handed to exclusion strategies.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    /// The name in the type declaration.
    pub declared_name: &'a str,
    /// The name after renames and the naming policy.
    pub serialized_name: &'a str,
    /// The type declaring the member.
    pub owner: &'static TypeDescriptor,
    /// The member's own type.
    pub ty: &'static TypeDescriptor,
}

/// Pluggable bind-time predicate deciding what never takes part in a
/// direction. Consulted once per type, not per document.
pub trait ExclusionStrategy: Send + Sync {
    /// Excludes the whole type: every member of it is skipped.
    fn skip_type(&self, _ty: &TypeDescriptor) -> bool {
        false
    }

    /// Excludes a single member.
    fn skip_field(&self, _field: &FieldView<'_>) -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// NullPolicy

/// What to do when JSON `null` arrives for a member that cannot represent
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Fail the read.
    #[default]
    Reject,
    /// Consume the null and keep the member's constructed value.
    DefaultValue,
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_names() {
        assert_eq!(NamingPolicy::Identity.apply("some_field"), "some_field");
    }

    #[test]
    fn lower_case_strips_separators() {
        assert_eq!(NamingPolicy::LowerCase.apply("user_name"), "username");
        assert_eq!(NamingPolicy::LowerCase.apply("UserName"), "username");
    }

    #[test]
    fn upper_camel_case() {
        assert_eq!(NamingPolicy::UpperCamelCase.apply("user_name"), "UserName");
        assert_eq!(NamingPolicy::UpperCamelCase.apply("x"), "X");
    }

    #[test]
    fn snake_and_kebab_case() {
        assert_eq!(NamingPolicy::SnakeCase.apply("userName"), "user_name");
        assert_eq!(NamingPolicy::KebabCase.apply("userName"), "user-name");
        assert_eq!(NamingPolicy::KebabCase.apply("user_name"), "user-name");
    }

    #[test]
    fn custom_function() {
        let policy = NamingPolicy::Custom(|name| format!("x_{name}"));
        assert_eq!(policy.apply("a"), "x_a");
    }
}
