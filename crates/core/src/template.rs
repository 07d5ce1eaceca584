//! Prompt template hydration.
//!
//! Agent instruction templates are rendered with Tera so the raw utterance
//! and user id are interpolated in one place, with autoescaping disabled so
//! the user's text reaches the model verbatim.

use crate::error::{Error, Result};
use tera::{Context, Tera};

/// Render a prompt template with the provided variables.
///
/// # Example
/// ```ignore
/// let prompt = render_prompt("User's query: \"{{ user_input }}\"", &[("user_input", "Help me.")])?;
/// assert_eq!(prompt, "User's query: \"Help me.\"");
/// ```
pub fn render_prompt(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut context = Context::new();
    for (key, value) in vars {
        context.insert(*key, value);
    }

    Tera::one_off(template, &context, false).map_err(|e| Error::Template(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_interpolates_verbatim() {
        let prompt = render_prompt(
            "Query: \"{{ user_input }}\"\nUserId: {{ user_id }}",
            &[("user_input", "Q3 <report> & \"AI\""), ("user_id", "N/A")],
        )
        .unwrap();

        assert_eq!(prompt, "Query: \"Q3 <report> & \"AI\"\"\nUserId: N/A");
    }

    #[test]
    fn test_render_keeps_json_schema_braces() {
        let prompt = render_prompt(
            "Return:\n{\n  \"problemType\": \"type_string\"\n}\nFor: {{ user_input }}",
            &[("user_input", "x")],
        )
        .unwrap();

        assert!(prompt.contains("\"problemType\": \"type_string\""));
        assert!(prompt.ends_with("For: x"));
    }

    #[test]
    fn test_render_reports_missing_variable() {
        let err = render_prompt("{{ nope }}", &[]).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }
}
