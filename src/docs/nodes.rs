//! Declaration nodes produced by the documentation analyzer
//!
//! Only namespaces and interfaces are modelled in depth, since those are the
//! kinds that merge. Other definitions are kept as raw JSON, and fields this
//! crate does not model are carried in `rest` maps, so nothing the analyzer
//! emits is lost on the way back out.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source location of a declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub filename: String,
    pub line: u32,
    pub col: u32,
    /// `byteIndex` and anything else the analyzer adds
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Doc comment attached to a declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl JsDoc {
    pub fn new(doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDef {
    #[serde(default)]
    pub elements: Vec<DocNode>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDef {
    #[serde(default)]
    pub call_signatures: Vec<Value>,
    #[serde(default)]
    pub index_signatures: Vec<Value>,
    #[serde(default)]
    pub methods: Vec<Value>,
    #[serde(default)]
    pub properties: Vec<Value>,
    /// Everything else (`extends`, `typeParams`, ...), passed through untouched
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Kind-specific part of a declaration, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DocNodeDef {
    ModuleDoc,
    Function { function_def: Value },
    Variable { variable_def: Value },
    Enum { enum_def: Value },
    Class { class_def: Value },
    TypeAlias { type_alias_def: Value },
    Namespace { namespace_def: NamespaceDef },
    Interface { interface_def: InterfaceDef },
    Import { import_def: Value },
}

impl DocNodeDef {
    /// Key holding the definition for nodes of `kind`
    fn definition_key(kind: &str) -> Option<&'static str> {
        match kind {
            "function" => Some("functionDef"),
            "variable" => Some("variableDef"),
            "enum" => Some("enumDef"),
            "class" => Some("classDef"),
            "typeAlias" => Some("typeAliasDef"),
            "namespace" => Some("namespaceDef"),
            "interface" => Some("interfaceDef"),
            "import" => Some("importDef"),
            _ => None,
        }
    }
}

/// A single documented declaration.
///
/// Deserialized by hand: the header, `kind` and definition keys are split off
/// first and whatever is left lands in `rest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js_doc: Option<JsDoc>,
    #[serde(flatten)]
    pub def: DocNodeDef,
    /// Node fields not modelled above (`isDefault`, `deprecated`, ...)
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocNodeHeader {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    declaration_kind: Option<String>,
    #[serde(default)]
    js_doc: Option<JsDoc>,
}

const HEADER_KEYS: &[&str] = &["name", "location", "declarationKind", "jsDoc"];

impl<'de> Deserialize<'de> for DocNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut rest = Map::<String, Value>::deserialize(deserializer)?;

        let header: Map<String, Value> = HEADER_KEYS
            .iter()
            .filter_map(|key| rest.remove(*key).map(|value| (key.to_string(), value)))
            .collect();
        let header: DocNodeHeader =
            serde_json::from_value(Value::Object(header)).map_err(de::Error::custom)?;

        let kind = rest
            .remove("kind")
            .ok_or_else(|| de::Error::missing_field("kind"))?;
        let mut def = Map::new();
        if let Some(key) = kind.as_str().and_then(DocNodeDef::definition_key) {
            if let Some(value) = rest.remove(key) {
                def.insert(key.to_string(), value);
            }
        }
        def.insert("kind".to_string(), kind);
        let def: DocNodeDef =
            serde_json::from_value(Value::Object(def)).map_err(de::Error::custom)?;

        Ok(Self {
            name: header.name,
            location: header.location,
            declaration_kind: header.declaration_kind,
            js_doc: header.js_doc,
            def,
            rest,
        })
    }
}

impl DocNode {
    pub fn new(name: impl Into<String>, def: DocNodeDef) -> Self {
        Self {
            name: name.into(),
            location: None,
            declaration_kind: None,
            js_doc: None,
            def,
            rest: Map::new(),
        }
    }

    pub fn namespace(name: impl Into<String>, elements: Vec<DocNode>) -> Self {
        Self::new(
            name,
            DocNodeDef::Namespace {
                namespace_def: NamespaceDef {
                    elements,
                    ..Default::default()
                },
            },
        )
    }

    pub fn interface(name: impl Into<String>, interface_def: InterfaceDef) -> Self {
        Self::new(name, DocNodeDef::Interface { interface_def })
    }

    pub fn with_js_doc(mut self, js_doc: JsDoc) -> Self {
        self.js_doc = Some(js_doc);
        self
    }

    /// The analyzer's `kind` string for this node
    pub fn kind(&self) -> &'static str {
        match self.def {
            DocNodeDef::ModuleDoc => "moduleDoc",
            DocNodeDef::Function { .. } => "function",
            DocNodeDef::Variable { .. } => "variable",
            DocNodeDef::Enum { .. } => "enum",
            DocNodeDef::Class { .. } => "class",
            DocNodeDef::TypeAlias { .. } => "typeAlias",
            DocNodeDef::Namespace { .. } => "namespace",
            DocNodeDef::Interface { .. } => "interface",
            DocNodeDef::Import { .. } => "import",
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self.def, DocNodeDef::Import { .. })
    }

    /// Elements of a namespace node
    pub fn namespace_elements(&self) -> Option<&[DocNode]> {
        match &self.def {
            DocNodeDef::Namespace { namespace_def } => Some(&namespace_def.elements),
            _ => None,
        }
    }
}

/// Look up a dotted symbol path such as `Deno.errors.NotFound`.
///
/// Leading segments walk into namespaces of the same name; a segment with no
/// matching namespace leaves the search at the current level. Every non-import
/// node named like the last segment is returned, so overloads come back
/// together.
pub fn find_symbol<'a>(entries: &'a [DocNode], symbol: &str) -> Vec<&'a DocNode> {
    let mut segments: Vec<&str> = symbol.split('.').collect();
    let Some(name) = segments.pop() else {
        return Vec::new();
    };

    let mut scope = entries;
    for segment in segments {
        let namespace = scope
            .iter()
            .filter(|node| node.name == segment)
            .find_map(DocNode::namespace_elements);
        if let Some(elements) = namespace {
            scope = elements;
        }
    }

    scope
        .iter()
        .filter(|node| node.name == name && !node.is_import())
        .collect()
}
