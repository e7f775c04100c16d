use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// How declared member names are turned into JSON names.
///
/// Conversions only touch the leading characters, so applying a convention
/// to its own output returns the input unchanged.
///
/// ```
/// use vc_json::NamingConvention;
///
/// assert_eq!(NamingConvention::Camel.apply("IDNumber"), "idNumber");
/// assert_eq!(NamingConvention::Camel.apply("ID"), "id");
/// assert_eq!(NamingConvention::Pascal.apply("userId"), "UserId");
/// assert_eq!(NamingConvention::None.apply("UserId"), "UserId");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingConvention {
    /// Names are written as declared.
    #[default]
    None,
    /// Leading uppercase run is lowered, `UserId` becomes `userId`.
    Camel,
    /// First character is raised, `userId` becomes `UserId`.
    Pascal,
}

impl NamingConvention {
    pub fn apply<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            Self::None => Cow::Borrowed(name),
            Self::Camel => to_camel_case(name),
            Self::Pascal => to_pascal_case(name),
        }
    }
}

fn to_camel_case(name: &str) -> Cow<'_, str> {
    let chars: Vec<char> = name.chars().collect();

    match chars.first() {
        Some(c) if c.is_uppercase() => {}
        _ => return Cow::Borrowed(name),
    }

    // Length of the leading run that gets lowered. In `IDNumber` the run is
    // `ID`, the `N` stays because it starts the next word.
    let mut run = 0;
    for i in 0..chars.len() {
        if i == 1 && !chars[i].is_uppercase() {
            break;
        }

        let next_is_upper = chars.get(i + 1).is_some_and(|c| c.is_uppercase());
        if i > 0 && i + 1 < chars.len() && !next_is_upper {
            if chars[i + 1].is_whitespace() {
                run = i + 1;
            }
            break;
        }

        run = i + 1;
    }

    let mut out = String::with_capacity(name.len());
    for (i, c) in chars.iter().enumerate() {
        if i < run {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    Cow::Owned(out)
}

fn to_pascal_case(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => {
            let mut out = String::with_capacity(name.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            Cow::Owned(out)
        }
        _ => Cow::Borrowed(name),
    }
}

// -----------------------------------------------------------------------------
// Tests
