//! Page copy, schema hints and links

use serde_json::Value as JsonValue;

use crate::types::*;
use crate::validate::{get_string, Object, Validator};

const ALLOWED_PAGE_CONTENT_KEYS: [&str; 7] =
    ["introduction", "methodology", "examples", "faqs", "citations", "glossary", "summary"];

impl Validator<'_> {
    pub(crate) fn parse_page_content(&mut self, candidate: Option<&JsonValue>) -> Option<PageContentConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(content) = candidate.as_object() else {
            self.error("page_content must be an object");
            return None;
        };

        let invalid: Vec<String> = content
            .keys()
            .filter(|k| !ALLOWED_PAGE_CONTENT_KEYS.contains(&k.as_str()))
            .map(|k| format!("\"{}\"", k))
            .collect();
        if !invalid.is_empty() {
            self.error(format!("unsupported page_content keys: {}", invalid.join(", ")));
        }

        let introduction = self.coerce_string_array(content.get("introduction"), "page_content.introduction");
        let methodology = self.coerce_string_array(content.get("methodology"), "page_content.methodology");
        let examples = self.coerce_string_array(content.get("examples"), "page_content.examples");
        let summary = self.coerce_string_array(content.get("summary"), "page_content.summary");

        let faqs = self.parse_entries(content.get("faqs"), "faqs", |v, path, item| {
            let (Some(question), Some(answer)) = (get_string(item, "question"), get_string(item, "answer")) else {
                v.error(format!("{} requires question and answer", path));
                return None;
            };
            v.guard_html(&question, &format!("{}.question", path));
            v.guard_html(&answer, &format!("{}.answer", path));
            Some(Faq { question, answer })
        });

        let citations = self.parse_entries(content.get("citations"), "citations", |v, path, item| {
            let Some(url) = get_string(item, "url") else {
                v.error(format!("{} requires url", path));
                return None;
            };
            let label = get_string(item, "label");
            let text = get_string(item, "text");
            if let Some(label) = &label {
                v.guard_html(label, &format!("{}.label", path));
            }
            if let Some(text) = &text {
                v.guard_html(text, &format!("{}.text", path));
            }
            Some(Citation { url, label, text })
        });

        let glossary = self.parse_entries(content.get("glossary"), "glossary", |v, path, item| {
            let (Some(term), Some(definition)) = (get_string(item, "term"), get_string(item, "definition")) else {
                v.error(format!("{} requires term and definition", path));
                return None;
            };
            v.guard_html(&term, &format!("{}.term", path));
            v.guard_html(&definition, &format!("{}.definition", path));
            Some(GlossaryEntry { term, definition })
        });

        Some(PageContentConfig { introduction, methodology, examples, summary, faqs, citations, glossary })
    }

    /// Shared walk for `page_content.<name>` object arrays. Empty results read as absent.
    fn parse_entries<T>(
        &mut self,
        candidate: Option<&JsonValue>,
        name: &str,
        mut parse: impl FnMut(&mut Self, &str, &Object) -> Option<T>,
    ) -> Option<Vec<T>> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(items) = candidate.as_array() else {
            self.error(format!("page_content.{} must be an array", name));
            return None;
        };

        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("page_content.{}[{}]", name, i);
            let Some(item) = item.as_object() else {
                self.error(format!("{} must be an object", path));
                continue;
            };
            if let Some(entry) = parse(self, &path, item) {
                entries.push(entry);
            }
        }

        (!entries.is_empty()).then_some(entries)
    }

    pub(crate) fn parse_schema(&mut self, candidate: Option<&JsonValue>) -> Option<SchemaConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(schema) = candidate.as_object() else {
            self.error("schema must be an object");
            return None;
        };
        Some(SchemaConfig {
            additional_types: self.coerce_string_array(schema.get("additionalTypes"), "schema.additionalTypes"),
        })
    }

    pub(crate) fn parse_links(&mut self, candidate: Option<&JsonValue>) -> Option<LinkConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(links) = candidate.as_object() else {
            self.error("links must be an object");
            return None;
        };

        let internal = self.coerce_string_array(links.get("internal"), "links.internal");
        let external = match links.get("external") {
            None => None,
            Some(JsonValue::Array(items)) => {
                let parsed: Vec<ExternalLink> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| self.parse_external_link(i, item))
                    .collect();
                (!parsed.is_empty()).then_some(parsed)
            }
            Some(_) => {
                self.error("links.external must be an array");
                None
            }
        };

        Some(LinkConfig { internal, external })
    }

    fn parse_external_link(&mut self, i: usize, item: &JsonValue) -> Option<ExternalLink> {
        let Some(item) = item.as_object() else {
            self.error(format!("links.external[{}] must be an object", i));
            return None;
        };
        let Some(url) = get_string(item, "url") else {
            self.error(format!("links.external[{}] requires url", i));
            return None;
        };

        let label = get_string(item, "label");
        if let Some(label) = &label {
            self.guard_html(label, &format!("links.external[{}].label", i));
        }

        let rel = match item.get("rel") {
            None => None,
            Some(JsonValue::Array(entries)) => {
                let mut rel = Vec::with_capacity(entries.len());
                for (j, entry) in entries.iter().enumerate() {
                    match entry.as_str() {
                        Some(s) => rel.push(s.trim().to_string()),
                        None => self.error(format!("links.external[{}].rel[{}] must be a string", i, j)),
                    }
                }
                Some(rel)
            }
            Some(JsonValue::String(s)) => Some(s.split(' ').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()),
            Some(_) => {
                self.error(format!("links.external[{}].rel must be a string or array", i));
                None
            }
        };

        Some(ExternalLink { url, label, rel })
    }
}

#[cfg(test)]
mod tests {
    use crate::validate_calculator_config;

    #[test]
    fn test_page_content() {
        let raw = r#"{"pageContent": {
            "introduction": "  Converts lengths.  ",
            "methodology": ["Step one", "   ", "Step two"],
            "faqs": [{"question": "Is it exact?", "answer": "Yes."}],
            "citations": [{"url": "https://www.nist.gov", "label": "NIST"}],
            "glossary": [{"term": "Meter", "definition": "SI unit of length"}]
        }}"#;
        let content = validate_calculator_config(raw, "len").config.unwrap().page_content.unwrap();
        assert_eq!(content.introduction, Some(vec!["Converts lengths.".to_string()]));
        assert_eq!(content.methodology.unwrap(), ["Step one", "Step two"]);
        assert_eq!(content.faqs.unwrap()[0].answer, "Yes.");
        assert_eq!(content.citations.unwrap()[0].label.as_deref(), Some("NIST"));
        assert_eq!(content.glossary.unwrap()[0].term, "Meter");
        assert!(content.summary.is_none());
    }

    #[test]
    fn test_page_content_errors() {
        let raw = r#"{"page_content": {
            "intro": "x",
            "examples": ["ok", 3],
            "faqs": {"question": "q"},
            "citations": [{"label": "no url"}],
            "glossary": [{"term": "<em>x</em>", "definition": "d"}]
        }}"#;
        assert_eq!(
            validate_calculator_config(raw, "len").errors,
            vec![
                r#"len: unsupported page_content keys: "intro""#,
                "len: page_content.examples[1] must be a string",
                "len: page_content.faqs must be an array",
                "len: page_content.citations[0] requires url",
                "len: page_content.glossary[0].term must not include HTML tags. Use plain text or Markdown.",
            ]
        );
    }

    #[test]
    fn test_schema_and_links() {
        let raw = r#"{
            "schema": {"additionalTypes": "HowTo"},
            "links": {
                "internal": ["/a", "/b"],
                "external": [
                    {"url": "https://example.org", "label": "Example", "rel": "nofollow  noopener"},
                    {"url": "https://example.com", "rel": ["sponsored"]}
                ]
            }
        }"#;
        let config = validate_calculator_config(raw, "x").config.unwrap();
        assert_eq!(config.schema.unwrap().additional_types, Some(vec!["HowTo".to_string()]));
        let links = config.links.unwrap();
        assert_eq!(links.internal.unwrap().len(), 2);
        let external = links.external.unwrap();
        assert_eq!(external[0].rel.as_deref(), Some(&["nofollow".to_string(), "noopener".to_string()][..]));
        assert_eq!(external[1].rel.as_deref(), Some(&["sponsored".to_string()][..]));
    }

    #[test]
    fn test_link_errors() {
        let raw = r#"{"links": {"external": [{"label": "x"}, {"url": "u", "rel": 5}, {"url": "v", "rel": ["a", 1]}]}}"#;
        assert_eq!(
            validate_calculator_config(raw, "x").errors,
            vec![
                "x: links.external[0] requires url",
                "x: links.external[1].rel must be a string or array",
                "x: links.external[2].rel[1] must be a string",
            ]
        );
        assert_eq!(
            validate_calculator_config(r#"{"links": {"external": {}}}"#, "x").errors,
            vec!["x: links.external must be an array"]
        );
    }
}
