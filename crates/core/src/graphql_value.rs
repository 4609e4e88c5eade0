//! A quoting-aware scalar used to render GraphQL mutation arguments by hand.
//!
//! The warehouse's mutation/query templates are built by string substitution
//! rather than a typed GraphQL client, so numeric and boolean arguments must
//! render unquoted while string arguments must render quoted with embedded
//! quotes escaped. This mirrors the quoting rules the original scheduler used
//! when building `update_api_schedule` mutations by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphQlValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Rendered as-is, with no quoting or escaping. For GraphQL enum
    /// literals and values the caller has already formatted.
    Raw(String),
}

impl GraphQlValue {
    /// Renders this value the way it should appear inside a GraphQL
    /// mutation argument list.
    pub fn render(&self) -> String {
        match self {
            GraphQlValue::Str(s) => format!("\"{}\"", escape_quotes(s)),
            GraphQlValue::Int(n) => n.to_string(),
            GraphQlValue::Float(f) => f.to_string(),
            GraphQlValue::Bool(b) => b.to_string(),
            GraphQlValue::Raw(s) => s.clone(),
        }
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_quoted_and_escaped() {
        let value = GraphQlValue::Str("hello \"world\"".to_string());
        assert_eq!(value.render(), "\"hello \\\"world\\\"\"");
    }

    #[test]
    fn numbers_and_bools_render_unquoted() {
        assert_eq!(GraphQlValue::Int(42).render(), "42");
        assert_eq!(GraphQlValue::Float(1.5).render(), "1.5");
        assert_eq!(GraphQlValue::Bool(true).render(), "true");
    }
}
