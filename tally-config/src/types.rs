//! The validated configuration tree

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    pub version: Option<String>,
    pub metadata: Option<MetadataConfig>,
    pub form: Option<FormConfig>,
    pub logic: Option<LogicConfig>,
    pub page_content: Option<PageContentConfig>,
    pub schema: Option<SchemaConfig>,
    pub links: Option<LinkConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormConfig {
    pub fields: Vec<FormField>,
    pub result: Option<FormResultConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormResultConfig {
    pub outputs: Vec<OutputSpec>,
}

/// A displayed result: id, label and optional unit suffix / format tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// How a calculator computes its outputs
#[derive(Debug, Clone, PartialEq)]
pub enum LogicConfig {
    Conversion(ConversionLogic),
    Formula(FormulaLogic),
    Advanced(AdvancedLogic),
    /// Any other `type`, kept verbatim
    Generic(GenericLogic),
}

impl LogicConfig {
    pub fn type_name(&self) -> &str {
        match self {
            LogicConfig::Conversion(_) => "conversion",
            LogicConfig::Formula(_) => "formula",
            LogicConfig::Advanced(_) => "advanced",
            LogicConfig::Generic(g) => &g.kind,
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for LogicConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.type_name();
        match self {
            LogicConfig::Conversion(body) => Tagged { kind, body }.serialize(serializer),
            LogicConfig::Formula(body) => Tagged { kind, body }.serialize(serializer),
            LogicConfig::Advanced(body) => Tagged { kind, body }.serialize(serializer),
            LogicConfig::Generic(body) => Tagged { kind, body }.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionLogic {
    pub from_unit_id: String,
    pub to_unit_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaLogic {
    pub outputs: Vec<FormulaOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaOutput {
    pub id: String,
    pub label: String,
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedLogic {
    pub methods: Vec<AdvancedMethod>,
    /// Always the id of one of `methods`
    pub default_method: String,
}

impl AdvancedLogic {
    /// The method with `id`, falling back to the first one
    pub fn method(&self, id: Option<&str>) -> Option<&AdvancedMethod> {
        id.and_then(|id| self.methods.iter().find(|m| m.id == id))
            .or_else(|| self.methods.first())
    }

    pub fn initial_method(&self) -> Option<&AdvancedMethod> {
        self.method(Some(&self.default_method))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedMethod {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declaration order is evaluation order
    #[serde(serialize_with = "variables_as_map")]
    pub variables: Vec<VariableDef>,
    pub outputs: Vec<AdvancedOutput>,
}

impl AdvancedMethod {
    pub fn variable(&self, id: &str) -> Option<&VariableDef> {
        self.variables.iter().find(|v| v.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDef {
    #[serde(skip)]
    pub id: String,
    pub expression: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

fn variables_as_map<S: Serializer>(variables: &[VariableDef], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(variables.len()))?;
    for v in variables {
        map.serialize_entry(&v.id, v)?;
    }
    map.end()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedOutput {
    pub id: String,
    pub label: String,
    /// Variable (or input) id the value is read from
    pub variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericLogic {
    #[serde(skip)]
    pub kind: String,
    pub data: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageContentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faqs: Option<Vec<Faq>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary: Option<Vec<GlossaryEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<Vec<ExternalLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<Vec<String>>,
}
