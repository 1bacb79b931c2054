// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal `{{field}}` template renderer.
//!
//! Substitutes `{{name}}` placeholders from the recipient's field map.
//! Unresolved placeholders stay visibly in the output text and are
//! reported in `missing_fields`, matching the engine's degrade-gracefully
//! contract.

use std::collections::BTreeMap;

use herald_core::traits::TemplateRenderer;
use herald_core::types::RenderedMessage;

pub struct BracesRenderer;

impl TemplateRenderer for BracesRenderer {
    fn render(&self, template: &str, fields: &BTreeMap<String, String>) -> RenderedMessage {
        let mut text = String::with_capacity(template.len());
        let mut missing: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            text.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match fields.get(key) {
                        Some(value) => text.push_str(value),
                        None => {
                            // Leave the marker visible in the sent text.
                            text.push_str("{{");
                            text.push_str(key);
                            text.push_str("}}");
                            if !missing.iter().any(|m| m == key) {
                                missing.push(key.to_string());
                            }
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    // Unterminated marker: treat as literal text.
                    text.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        text.push_str(rest);

        RenderedMessage {
            text,
            missing_fields: missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_fields() {
        let rendered = BracesRenderer.render(
            "Hi {{name}}, your code is {{code}}.",
            &fields(&[("name", "Ada"), ("code", "1234")]),
        );
        assert_eq!(rendered.text, "Hi Ada, your code is 1234.");
        assert!(rendered.missing_fields.is_empty());
    }

    #[test]
    fn missing_fields_stay_visible_and_reported() {
        let rendered = BracesRenderer.render("Hi {{name}}, bye {{name}}.", &fields(&[]));
        assert_eq!(rendered.text, "Hi {{name}}, bye {{name}}.");
        assert_eq!(rendered.missing_fields, vec!["name".to_string()]);
    }

    #[test]
    fn unterminated_marker_is_literal() {
        let rendered = BracesRenderer.render("Hi {{name", &fields(&[("name", "Ada")]));
        assert_eq!(rendered.text, "Hi {{name");
        assert!(rendered.missing_fields.is_empty());
    }

    #[test]
    fn whitespace_in_markers_is_tolerated() {
        let rendered = BracesRenderer.render("Hi {{ name }}!", &fields(&[("name", "Ada")]));
        assert_eq!(rendered.text, "Hi Ada!");
    }
}
