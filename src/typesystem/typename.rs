use std::fmt;

use crate::Result;

/// A fully qualified type identifier as stored inside serialized records.
///
/// Identifiers consist of two parts:
/// - The namespace path (dot-separated, e.g. `legacy.shapes`)
/// - The type name within that namespace (e.g. `Polygon`)
///
/// The canonical string form is `namespace name` with a single space separator,
/// which is also the form rename rule sources use for their keys and values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName {
    namespace: String,
    name: String,
}

impl TypeName {
    /// Creates a new identifier from its namespace path and type name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parses the canonical `namespace name` string form.
    ///
    /// Exactly one space separates the two parts; both must be non-empty.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIdentifier`] when the separator is missing,
    /// either part is empty, or the name contains further spaces.
    pub fn parse(input: &str) -> Result<Self> {
        let Some((namespace, name)) = input.split_once(' ') else {
            return Err(crate::Error::InvalidIdentifier(format!(
                "missing space separator in '{input}'"
            )));
        };

        if namespace.is_empty() || name.is_empty() {
            return Err(crate::Error::InvalidIdentifier(format!(
                "empty namespace or name in '{input}'"
            )));
        }

        if name.contains(' ') {
            return Err(crate::Error::InvalidIdentifier(format!(
                "name contains spaces in '{input}'"
            )));
        }

        Ok(TypeName::new(namespace, name))
    }

    /// Parses the legacy dot-qualified spelling (`namespace.path.Name`).
    ///
    /// The split happens at the last dot, so namespaces may themselves contain
    /// dots. Older record writers emitted this single-string form.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIdentifier`] when no dot is present or
    /// either side of the final dot is empty.
    pub fn parse_dotted(input: &str) -> Result<Self> {
        let Some((namespace, name)) = input.rsplit_once('.') else {
            return Err(crate::Error::InvalidIdentifier(format!(
                "missing namespace in dotted identifier '{input}'"
            )));
        };

        if namespace.is_empty() || name.is_empty() {
            return Err(crate::Error::InvalidIdentifier(format!(
                "empty namespace or name in dotted identifier '{input}'"
            )));
        }

        Ok(TypeName::new(namespace, name))
    }

    /// Returns the namespace path.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the type name within the namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<(&str, &str)> for TypeName {
    fn from((namespace, name): (&str, &str)) -> Self {
        TypeName::new(namespace, name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_type_name_new() {
        let name = TypeName::new("legacy.shapes", "Polygon");
        assert_eq!(name.namespace(), "legacy.shapes");
        assert_eq!(name.name(), "Polygon");
    }

    #[test]
    fn test_type_name_parse() {
        let name = TypeName::parse("legacy.shapes Polygon").unwrap();
        assert_eq!(name.namespace(), "legacy.shapes");
        assert_eq!(name.name(), "Polygon");

        let flat = TypeName::parse("toplevel Widget").unwrap();
        assert_eq!(flat.namespace(), "toplevel");
        assert_eq!(flat.name(), "Widget");
    }

    #[test]
    fn test_type_name_parse_rejects_bad_input() {
        assert!(TypeName::parse("nosplit").is_err());
        assert!(TypeName::parse(" Polygon").is_err());
        assert!(TypeName::parse("legacy.shapes ").is_err());
        assert!(TypeName::parse("legacy.shapes Poly gon").is_err());
        assert!(TypeName::parse("").is_err());
    }

    #[test]
    fn test_type_name_parse_dotted() {
        let name = TypeName::parse_dotted("legacy.shapes.Polygon").unwrap();
        assert_eq!(name.namespace(), "legacy.shapes");
        assert_eq!(name.name(), "Polygon");

        let flat = TypeName::parse_dotted("toplevel.Widget").unwrap();
        assert_eq!(flat.namespace(), "toplevel");
        assert_eq!(flat.name(), "Widget");
    }

    #[test]
    fn test_type_name_parse_dotted_rejects_bad_input() {
        assert!(TypeName::parse_dotted("Widget").is_err());
        assert!(TypeName::parse_dotted(".Widget").is_err());
        assert!(TypeName::parse_dotted("legacy.").is_err());
        assert!(TypeName::parse_dotted("").is_err());
    }

    #[test]
    fn test_type_name_display_round_trip() {
        let name = TypeName::new("legacy.shapes", "Polygon");
        let rendered = name.to_string();
        assert_eq!(rendered, "legacy.shapes Polygon");
        assert_eq!(TypeName::parse(&rendered).unwrap(), name);
    }

    #[test]
    fn test_type_name_unicode() {
        let name = TypeName::parse("données Forme").unwrap();
        assert_eq!(name.namespace(), "données");
        assert_eq!(name.name(), "Forme");
    }

    #[test]
    fn test_type_name_ordering() {
        let mut map = BTreeMap::new();
        map.insert(TypeName::new("b", "B"), 1);
        map.insert(TypeName::new("a", "Z"), 2);
        map.insert(TypeName::new("a", "A"), 3);

        let keys: Vec<String> = map.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["a A", "a Z", "b B"]);
    }

    #[test]
    fn test_type_name_from_pair() {
        let name: TypeName = ("legacy.shapes", "Polygon").into();
        assert_eq!(name, TypeName::new("legacy.shapes", "Polygon"));
    }
}
