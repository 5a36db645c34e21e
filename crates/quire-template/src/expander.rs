//! Recursive expansion of embedded fragments.
//!
//! An embedded fragment is an HTML snippet bound to a dotted payload path.
//! Expanding it against a scope produces one copy of the snippet per array
//! element (or a single copy for an object), with the element's scalar
//! fields substituted and nested fragments expanded in place.
//!
//! Recursion is driven by placeholders: a child fragment `key.child` is only
//! expanded when `{{key.child}}` literally occurs in the parent's snippet.
//!
//! ```text
//! fragments:  items      = <li>{{items.label}}<ul>{{items.tags}}</ul></li>
//!             items.tags = <li>{{items.tags.label}}</li>
//!
//! payload:    items: [{label: "A", tags: [{label: "x"}, {label: "y"}]}]
//!
//! expand("items") = <li>A<ul><li>x</li><li>y</li></ul></li>
//! ```

use crate::definition::{FragmentMap, last_segment, parent_key};
use crate::error::TemplateError;
use crate::resolver::{format_value, placeholder};
use crate::value::{Map, Value};

/// Expands embedded fragments against payload scopes.
///
/// Keeps the chain of fragments currently being expanded so that a fragment
/// re-entering itself fails with [`TemplateError::Cycle`] instead of
/// recursing without bound.
pub struct FragmentExpander<'a> {
    fragments: &'a FragmentMap,
    stack: Vec<String>,
}

impl<'a> FragmentExpander<'a> {
    /// Create an expander over a template's embedded fragments.
    #[must_use]
    pub fn new(fragments: &'a FragmentMap) -> Self {
        Self {
            fragments,
            stack: Vec::new(),
        }
    }

    /// Expand fragment `key` with HTML `snippet` against `scope`.
    ///
    /// The value is looked up in `scope` by the last segment of `key`; callers
    /// pass scopes that are already narrowed to the fragment's parent element.
    ///
    /// | value            | result                                   |
    /// |------------------|------------------------------------------|
    /// | missing / null   | empty                                    |
    /// | empty array      | empty                                    |
    /// | array of objects | snippet per element, concatenated        |
    /// | array of scalars | `{{key}}` replaced per element           |
    /// | object           | snippet once                             |
    /// | scalar           | the value's plain string form            |
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Cycle`] if `key` is already being expanded.
    pub fn expand(&mut self, key: &str, snippet: &str, scope: &Map) -> Result<String, TemplateError> {
        self.expand_value(key, snippet, scope.get(last_segment(key)))
    }

    fn expand_value(
        &mut self,
        key: &str,
        snippet: &str,
        value: Option<&Value>,
    ) -> Result<String, TemplateError> {
        if self.stack.iter().any(|k| k == key) {
            let mut path = self.stack.clone();
            path.push(key.to_owned());
            return Err(TemplateError::Cycle { path });
        }

        self.stack.push(key.to_owned());
        let result = self.expand_shape(key, snippet, value);
        self.stack.pop();
        result
    }

    fn expand_shape(
        &mut self,
        key: &str,
        snippet: &str,
        value: Option<&Value>,
    ) -> Result<String, TemplateError> {
        match value {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::Array(items)) => match items.first() {
                None => Ok(String::new()),
                // Shape is decided by the first element
                Some(Value::Object(_)) => {
                    let mut out = String::new();
                    for item in items {
                        if let Value::Object(fields) = item {
                            out.push_str(&self.expand_element(key, snippet, fields)?);
                        }
                    }
                    Ok(out)
                }
                Some(_) => {
                    let token = placeholder(key);
                    Ok(items
                        .iter()
                        .map(|item| snippet.replace(&token, &item.to_string()))
                        .collect())
                }
            },
            Some(Value::Object(fields)) => self.expand_element(key, snippet, fields),
            Some(scalar) => Ok(scalar.to_string()),
        }
    }

    /// Render one element: nested fragments first, then scalar fields.
    fn expand_element(
        &mut self,
        key: &str,
        snippet: &str,
        fields: &Map,
    ) -> Result<String, TemplateError> {
        let mut html = snippet.to_owned();

        let fragments = self.fragments;
        for (child_key, child_snippet) in fragments
            .iter()
            .filter(|(child, _)| parent_key(child) == Some(key))
        {
            let token = placeholder(child_key);
            if !html.contains(&token) {
                continue;
            }
            let nested = fields.get(last_segment(child_key));
            let rendered = match nested {
                Some(value) => self.expand_value(child_key, child_snippet, Some(value))?,
                None => String::new(),
            };
            html = html.replace(&token, &rendered);
        }

        for (field, value) in fields {
            // Containers are rendered only through their own fragments
            if value.is_container() {
                continue;
            }
            let token = placeholder(&format!("{key}.{field}"));
            if html.contains(&token) {
                html = html.replace(&token, &format_value(value));
            }
        }

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::value::payload_from_json;

    fn fragments(entries: &[(&str, &str)]) -> FragmentMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn expand(map: &FragmentMap, key: &str, data: serde_json::Value) -> String {
        let scope = payload_from_json(data);
        FragmentExpander::new(map)
            .expand(key, &map[key], &scope)
            .unwrap()
    }

    #[test]
    fn test_array_of_objects_scenario_b() {
        let map = fragments(&[("items", "<li>{{items.label}}</li>")]);
        let html = expand(
            &map,
            "items",
            json!({"items": [{"label": "A"}, {"label": "B"}]}),
        );
        assert_eq!(html, "<li>A</li><li>B</li>");
    }

    #[test]
    fn test_nested_fragment_scenario_c() {
        let map = fragments(&[
            ("items", "<div>{{items.name}}<ul>{{items.tags}}</ul></div>"),
            ("items.tags", "<li>{{items.tags.label}}</li>"),
        ]);
        let html = expand(
            &map,
            "items",
            json!({"items": [{"name": "Kitchen", "tags": [{"label": "x"}, {"label": "y"}]}]}),
        );
        assert_eq!(html, "<div>Kitchen<ul><li>x</li><li>y</li></ul></div>");
    }

    #[test]
    fn test_three_levels_deep() {
        let map = fragments(&[
            ("areas", "<section>{{areas.name}}{{areas.rows}}</section>"),
            ("areas.rows", "<tr>{{areas.rows.no}}{{areas.rows.parts}}</tr>"),
            ("areas.rows.parts", "<i>{{areas.rows.parts}}</i>"),
        ]);
        let html = expand(
            &map,
            "areas",
            json!({"areas": [
                {"name": "A1", "rows": [{"no": "1", "parts": ["p", "q"]}]},
                {"name": "A2", "rows": []}
            ]}),
        );
        assert_eq!(
            html,
            "<section>A1<tr>1<i>p</i><i>q</i></tr></section><section>A2</section>"
        );
    }

    #[test]
    fn test_missing_and_null_values_drop_section() {
        let map = fragments(&[("items", "<li>{{items.label}}</li>")]);
        assert_eq!(expand(&map, "items", json!({})), "");
        assert_eq!(expand(&map, "items", json!({"items": null})), "");
        assert_eq!(expand(&map, "items", json!({"items": []})), "");
    }

    #[test]
    fn test_array_of_scalars() {
        let map = fragments(&[("notes", "<p>{{notes}}</p>")]);
        let html = expand(&map, "notes", json!({"notes": ["one", 2, true]}));
        assert_eq!(html, "<p>one</p><p>2</p><p>true</p>");
    }

    #[test]
    fn test_single_object() {
        let map = fragments(&[("customer", "<h2>{{customer.name}}</h2><p>{{customer.balance}}</p>")]);
        let html = expand(
            &map,
            "customer",
            json!({"customer": {"name": "Acme", "balance": 10}}),
        );
        assert_eq!(html, "<h2>Acme</h2><p>10.00</p>");
    }

    #[test]
    fn test_scalar_ignores_snippet() {
        let map = fragments(&[("title", "<h1>{{title}}</h1>")]);
        assert_eq!(expand(&map, "title", json!({"title": "Report"})), "Report");
        assert_eq!(expand(&map, "title", json!({"title": 2.5})), "2.5");
    }

    #[test]
    fn test_nested_containers_not_substituted_without_fragment() {
        let map = fragments(&[("items", "<li>{{items.label}}|{{items.meta}}</li>")]);
        let html = expand(
            &map,
            "items",
            json!({"items": [{"label": "A", "meta": {"k": "v"}}]}),
        );
        assert_eq!(html, "<li>A|{{items.meta}}</li>");
    }

    #[test]
    fn test_child_placeholder_with_missing_field_is_emptied() {
        let map = fragments(&[
            ("items", "<li>{{items.label}}[{{items.tags}}]</li>"),
            ("items.tags", "<b>{{items.tags.label}}</b>"),
        ]);
        let html = expand(&map, "items", json!({"items": [{"label": "A"}]}));
        assert_eq!(html, "<li>A[]</li>");
    }

    #[test]
    fn test_child_not_referenced_is_not_expanded() {
        let map = fragments(&[
            ("items", "<li>{{items.label}}</li>"),
            ("items.tags", "<b>{{items.tags.label}}</b>"),
        ]);
        let html = expand(
            &map,
            "items",
            json!({"items": [{"label": "A", "tags": [{"label": "x"}]}]}),
        );
        assert_eq!(html, "<li>A</li>");
    }

    #[test]
    fn test_only_direct_children_expanded() {
        // grandchild placeholder in the parent snippet is left alone
        let map = fragments(&[
            ("a", "{{a.b.c}}"),
            ("a.b", "{{a.b.c}}"),
            ("a.b.c", "<i>{{a.b.c}}</i>"),
        ]);
        let html = expand(&map, "a", json!({"a": {"c": ["z"]}}));
        assert_eq!(html, "{{a.b.c}}");
    }

    #[test]
    fn test_mixed_array_skips_non_objects() {
        let map = fragments(&[("items", "<li>{{items.label}}</li>")]);
        let html = expand(
            &map,
            "items",
            json!({"items": [{"label": "A"}, "stray", {"label": "B"}]}),
        );
        assert_eq!(html, "<li>A</li><li>B</li>");
    }

    #[test]
    fn test_reentering_fragment_is_cycle() {
        let map = fragments(&[
            ("items", "<li>{{items.sub}}</li>"),
            ("items.sub", "<b>{{items.sub.x}}</b>"),
        ]);
        let scope = payload_from_json(json!({"items": [{"sub": {"x": "1"}}]}));
        let mut expander = FragmentExpander::new(&map);
        expander.stack.push("items.sub".to_owned());

        let err = expander.expand("items", &map["items"], &scope).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Cycle {
                path: vec![
                    "items.sub".to_owned(),
                    "items".to_owned(),
                    "items.sub".to_owned()
                ]
            }
        );
    }

    #[test]
    fn test_stack_unwinds_between_siblings() {
        let map = fragments(&[
            ("rows", "<tr>{{rows.cells}}</tr>"),
            ("rows.cells", "<td>{{rows.cells}}</td>"),
        ]);
        let html = expand(
            &map,
            "rows",
            json!({"rows": [{"cells": ["a", "b"]}, {"cells": ["c"]}]}),
        );
        assert_eq!(html, "<tr><td>a</td><td>b</td></tr><tr><td>c</td></tr>");
    }
}
