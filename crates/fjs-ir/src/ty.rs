//! The closed type language consumed by inference and codegen.
//!
//! Deliberately small: the transpiler needs enough typing to drive numeric
//! promotion, `is`-check lowering, and diagnostics, not a full Dart type
//! system. Anything outside the closed set degrades to `Dynamic`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimKind {
    Int,
    Double,
    Bool,
    String,
}

/// Closed type hierarchy. Value semantics throughout; types are compared
/// structurally and never interned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeIr {
    Primitive { prim: PrimKind },
    Named {
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        type_args: Vec<TypeIr>,
    },
    /// An unsubstituted type parameter (`T` in `List<T>`).
    Generic { name: String },
    Function {
        params: Vec<TypeIr>,
        ret: Box<TypeIr>,
    },
    Void,
    Dynamic,
}

impl TypeIr {
    pub const INT: TypeIr = TypeIr::Primitive { prim: PrimKind::Int };
    pub const DOUBLE: TypeIr = TypeIr::Primitive { prim: PrimKind::Double };
    pub const BOOL: TypeIr = TypeIr::Primitive { prim: PrimKind::Bool };
    pub const STRING: TypeIr = TypeIr::Primitive { prim: PrimKind::String };

    pub fn named(name: impl Into<String>) -> TypeIr {
        TypeIr::Named {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    pub fn named_with(name: impl Into<String>, type_args: Vec<TypeIr>) -> TypeIr {
        TypeIr::Named {
            name: name.into(),
            type_args,
        }
    }

    /// Parse a declared Dart type annotation. Unknown names become `Named`
    /// types; only the closed primitive set, `void` and `dynamic` are
    /// special.
    pub fn from_annotation(name: &str) -> TypeIr {
        match name {
            "int" => TypeIr::INT,
            "double" | "num" => TypeIr::DOUBLE,
            "bool" => TypeIr::BOOL,
            "String" => TypeIr::STRING,
            "void" => TypeIr::Void,
            "dynamic" | "Object" | "Object?" | "" => TypeIr::Dynamic,
            other => {
                // `List<int>` style annotations keep their argument list.
                if let Some(open) = other.find('<') {
                    let base = &other[..open];
                    let inner = other[open + 1..].trim_end_matches('>');
                    let args = split_type_args(inner)
                        .into_iter()
                        .map(TypeIr::from_annotation)
                        .collect();
                    TypeIr::named_with(base, args)
                } else {
                    TypeIr::named(other.trim_end_matches('?'))
                }
            }
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeIr::Dynamic)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeIr::Void)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeIr::Primitive { prim: PrimKind::Int } | TypeIr::Primitive { prim: PrimKind::Double }
        )
    }

    /// Least common supertype of two branch types, per the inference rules:
    /// equal types join to themselves, `int`/`double` join to `double`,
    /// anything else has no common supertype here (the caller degrades to
    /// `Dynamic` with a warning).
    pub fn common_supertype(a: &TypeIr, b: &TypeIr) -> Option<TypeIr> {
        if a == b {
            return Some(a.clone());
        }
        if a.is_numeric() && b.is_numeric() {
            return Some(TypeIr::DOUBLE);
        }
        if a.is_dynamic() || b.is_dynamic() {
            return Some(TypeIr::Dynamic);
        }
        None
    }
}

fn split_type_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }
    args
}

impl fmt::Display for TypeIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIr::Primitive { prim } => {
                let name = match prim {
                    PrimKind::Int => "int",
                    PrimKind::Double => "double",
                    PrimKind::Bool => "bool",
                    PrimKind::String => "String",
                };
                f.write_str(name)
            }
            TypeIr::Named { name, type_args } => {
                f.write_str(name)?;
                if !type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeIr::Generic { name } => f.write_str(name),
            TypeIr::Function { params, ret } => {
                write!(f, "{ret} Function(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
            TypeIr::Void => f.write_str("void"),
            TypeIr::Dynamic => f.write_str("dynamic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_parsing_covers_closed_set() {
        assert_eq!(TypeIr::from_annotation("int"), TypeIr::INT);
        assert_eq!(TypeIr::from_annotation("String"), TypeIr::STRING);
        assert_eq!(TypeIr::from_annotation("void"), TypeIr::Void);
        assert_eq!(TypeIr::from_annotation("dynamic"), TypeIr::Dynamic);
        assert_eq!(
            TypeIr::from_annotation("Widget"),
            TypeIr::named("Widget")
        );
        assert_eq!(
            TypeIr::from_annotation("List<int>"),
            TypeIr::named_with("List", vec![TypeIr::INT])
        );
        assert_eq!(
            TypeIr::from_annotation("Map<String, List<int>>"),
            TypeIr::named_with(
                "Map",
                vec![TypeIr::STRING, TypeIr::named_with("List", vec![TypeIr::INT])]
            )
        );
    }

    #[test]
    fn numeric_join_promotes_to_double() {
        assert_eq!(
            TypeIr::common_supertype(&TypeIr::INT, &TypeIr::DOUBLE),
            Some(TypeIr::DOUBLE)
        );
        assert_eq!(
            TypeIr::common_supertype(&TypeIr::INT, &TypeIr::INT),
            Some(TypeIr::INT)
        );
        assert_eq!(
            TypeIr::common_supertype(&TypeIr::STRING, &TypeIr::BOOL),
            None
        );
        assert_eq!(
            TypeIr::common_supertype(&TypeIr::STRING, &TypeIr::Dynamic),
            Some(TypeIr::Dynamic)
        );
    }

    #[test]
    fn display_round_trips_named_generics() {
        let ty = TypeIr::named_with("Map", vec![TypeIr::STRING, TypeIr::INT]);
        assert_eq!(ty.to_string(), "Map<String, int>");
        assert_eq!(TypeIr::from_annotation("Map<String, int>"), ty);
    }
}
