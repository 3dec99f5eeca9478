//! Main schema loader: compiles documents into schema graphs
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::{
    error::{LoadError, LoadResult, ReferenceResolutionError, TypeMismatchError},
    fetcher::{ReferenceFetcher, RejectingFetcher},
    formats::FormatRegistry,
    narrowing::require,
    parser::DocumentParser,
    registry::{canonical_key, ReferenceRegistry},
    resolver::{
        apply_id, enclosing_scope, resolve_reference, split_reference, Document, Fragment,
        IdIndex, Target,
    },
};
use crate::schema::{
    CompiledSchema, GraphBuilder, ReferenceSchema, Schema, SchemaId, SchemaLocation,
    SchemaMetadata, SchemaNode,
};
use crate::value::{JsonPointer, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Base URI used when the caller does not supply one
pub const DEFAULT_BASE_URI: &str = "mem://root";

/// What to do with keywords of several primitive types on one schema object
/// when no `type` array declares the alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTypePolicy {
    /// Every group applies; each one ignores instances of other kinds
    #[default]
    Conjunction,
    /// Refuse to load the schema
    Reject,
}

/// Configuration for schema loader behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Handling of mixed primitive keyword groups
    pub multi_type_policy: MultiTypePolicy,
    /// Maximum nesting of `$ref` targets loaded through one another
    pub max_reference_depth: usize,
    /// Whether `format` is enforced for registered format names
    pub validate_formats: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            multi_type_policy: MultiTypePolicy::Conjunction,
            max_reference_depth: 64,
            validate_formats: true,
        }
    }
}

impl LoaderConfig {
    pub fn with_multi_type_policy(mut self, policy: MultiTypePolicy) -> Self {
        self.multi_type_policy = policy;
        self
    }

    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn with_validate_formats(mut self, enabled: bool) -> Self {
        self.validate_formats = enabled;
        self
    }
}

/// Compiles schema documents into [`CompiledSchema`] graphs
///
/// The loader holds configuration only; every call to [`SchemaLoader::load`]
/// builds its graph in fresh per-call state, so one loader can be shared.
pub struct SchemaLoader {
    config: LoaderConfig,
    fetcher: Arc<dyn ReferenceFetcher>,
    formats: FormatRegistry,
    parser: DocumentParser,
}

impl SchemaLoader {
    /// Create a loader with default configuration and no external fetching
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a loader with custom configuration
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            config,
            fetcher: Arc::new(RejectingFetcher),
            formats: FormatRegistry::default(),
            parser: DocumentParser::new(),
        }
    }

    /// Use `fetcher` for documents that are not part of the input
    pub fn with_fetcher<F: ReferenceFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Replace the format registry
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Compile `document`, resolving relative references against `base_uri`
    pub fn load(&self, document: &Value, base_uri: &str) -> LoadResult<CompiledSchema> {
        let base = Url::parse(base_uri).map_err(|e| LoadError::invalid_base_uri(base_uri, e))?;
        tracing::debug!(base = %base, "loading schema");

        let mut state = LoadingState::new(self);
        let document = Document::new(document.clone(), base.clone());
        let key = document.key();
        let value = Arc::clone(&document.value);
        state.add_document(document);

        let frame = Frame {
            document: key,
            pointer: JsonPointer::root(),
            scope: base,
        };
        let root = state.load_subschema(&value, frame)?;
        let nodes = state.builder.len();
        let references = state.registry.len();
        let compiled = state.builder.finish(root)?;

        tracing::debug!(nodes, references, "schema loaded");
        Ok(compiled)
    }

    /// Compile a JSON document given as text
    pub fn load_str(&self, text: &str, base_uri: &str) -> LoadResult<CompiledSchema> {
        let document = self.parser.parse_json(text, base_uri)?;
        self.load(&document, base_uri)
    }

    /// Compile a JSON or YAML file; relative references resolve against its
    /// `file://` URI
    pub fn load_file(&self, path: &Path) -> LoadResult<CompiledSchema> {
        let document = self.parser.parse_file(path)?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| LoadError::invalid_base_uri(path.display().to_string(), e))?
                .join(path)
        };
        let base = Url::from_file_path(&absolute).map_err(|_| {
            LoadError::invalid_base_uri(absolute.display().to_string(), "not an absolute path")
        })?;
        self.load(&document, base.as_str())
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaLoader")
            .field("config", &self.config)
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

/// Position of the schema being loaded
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    /// Canonical key of the document
    pub document: String,
    pub pointer: JsonPointer,
    /// `$id` scope enclosing this node
    pub scope: Url,
}

impl Frame {
    pub fn child<T: ToString>(&self, token: T) -> Self {
        Self {
            document: self.document.clone(),
            pointer: self.pointer.child(token),
            scope: self.scope.clone(),
        }
    }

    pub fn location(&self) -> SchemaLocation {
        SchemaLocation::new(self.document.clone(), self.pointer.clone())
    }
}

/// Per-call state of one load
pub(crate) struct LoadingState<'l> {
    pub loader: &'l SchemaLoader,
    pub builder: GraphBuilder,
    registry: ReferenceRegistry,
    documents: HashMap<String, Document>,
    ids: IdIndex,
    reference_depth: usize,
}

impl<'l> LoadingState<'l> {
    fn new(loader: &'l SchemaLoader) -> Self {
        Self {
            loader,
            builder: GraphBuilder::new(),
            registry: ReferenceRegistry::new(),
            documents: HashMap::new(),
            ids: IdIndex::new(),
            reference_depth: 0,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.loader.config
    }

    fn add_document(&mut self, document: Document) {
        self.ids.scan(&document);
        self.documents.insert(document.key(), document);
    }

    /// Load the schema at `frame`, reusing the slot if that location was
    /// already loaded or is being loaded
    pub fn load_subschema(&mut self, value: &Value, frame: Frame) -> LoadResult<SchemaId> {
        let key = canonical_key(&frame.document, &frame.pointer);
        if let Some(id) = self.registry.lookup(&key) {
            return Ok(id);
        }
        let id = self.builder.reserve();
        self.registry.register(key, id);

        let mut frame = frame;
        apply_id(&mut frame.scope, value);
        let node = self.build_node(value, &frame)?;
        self.builder.fill(id, node)?;
        Ok(id)
    }

    /// Add a node that has no location of its own in the document
    pub fn add_node(&mut self, schema: Schema, location: &SchemaLocation) -> SchemaId {
        self.builder.add(SchemaNode::at(schema, location.clone()))
    }

    fn build_node(&mut self, value: &Value, frame: &Frame) -> LoadResult<SchemaNode> {
        let location = frame.location();
        let object = match value {
            Value::Bool(true) => return Ok(SchemaNode::at(Schema::Empty, location)),
            Value::Bool(false) => return Ok(SchemaNode::at(Schema::False, location)),
            Value::Object(object) => object,
            other => {
                return Err(TypeMismatchError {
                    keyword: "schema".to_string(),
                    location: location.to_string(),
                    expected: vec![ValueKind::Object, ValueKind::Boolean],
                    actual: ValueKind::of(other),
                }
                .into())
            }
        };

        let metadata = self.load_metadata(object, frame, &location)?;
        let mut groups = self.load_groups(object, frame, &location)?;

        let schema = match groups.len() {
            0 => Schema::Empty,
            1 => groups.remove(0),
            _ => {
                let ids = groups
                    .into_iter()
                    .map(|group| self.add_node(group, &location))
                    .collect::<Vec<_>>();
                Schema::Combined(self.synthetic_all_of(ids, &location)?)
            }
        };
        Ok(SchemaNode::new(schema, metadata))
    }

    fn load_metadata(
        &self,
        object: &serde_json::Map<String, Value>,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<SchemaMetadata> {
        let text = |keyword: &'static str| -> LoadResult<Option<String>> {
            match object.get(keyword) {
                Some(value) => require(keyword, value, location, ValueKind::String)
                    .map(|v| v.as_str().map(str::to_string)),
                None => Ok(None),
            }
        };
        let id = text("$id")?.map(|_| frame.scope.to_string());

        Ok(SchemaMetadata {
            location: location.clone(),
            id,
            title: text("title")?,
            description: text("description")?,
            default: object.get("default").cloned(),
        })
    }

    /// Resolve a `$ref` and point a reference node at its target slot
    pub fn load_reference(
        &mut self,
        reference: &str,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Schema> {
        let uri = resolve_reference(&frame.scope, reference)
            .map_err(|e| ReferenceResolutionError::invalid_uri(reference, location, e))?;
        let target = self.locate(&uri, reference, location)?;
        let key = canonical_key(&target.document, &target.pointer);

        let id = match self.registry.lookup(&key) {
            Some(id) => id,
            None => self.load_target(target, reference, location)?,
        };
        tracing::debug!(reference, canonical = %key, target = %id, "resolved reference");
        Ok(Schema::Reference(ReferenceSchema::new(reference, key, id)))
    }

    fn locate(
        &mut self,
        uri: &Url,
        reference: &str,
        location: &SchemaLocation,
    ) -> LoadResult<Target> {
        let (document_key, fragment) = split_reference(uri)
            .map_err(|reason| ReferenceResolutionError::invalid_uri(reference, location, reason))?;
        let mut document_uri = uri.clone();
        document_uri.set_fragment(None);

        let base = match self.ids.lookup(&document_uri) {
            Some(target) => target.clone(),
            None => {
                self.fetch_document(&document_uri, location)?;
                Target {
                    document: document_key.clone(),
                    pointer: JsonPointer::root(),
                }
            }
        };

        match fragment {
            Fragment::Root => Ok(base),
            Fragment::Pointer(pointer) => Ok(Target {
                document: base.document,
                pointer: base.pointer.join(&pointer),
            }),
            Fragment::PlainName(name) => self.ids.lookup(uri).cloned().ok_or_else(|| {
                ReferenceResolutionError::unresolvable_pointer(
                    &document_key,
                    &format!("#{}", name),
                    location,
                    "no subschema declares this identifier",
                )
                .into()
            }),
        }
    }

    fn fetch_document(&mut self, uri: &Url, location: &SchemaLocation) -> LoadResult<()> {
        tracing::debug!(uri = %uri, "fetching external document");
        let value = self
            .loader
            .fetcher
            .fetch(uri)
            .map_err(|e| ReferenceResolutionError::fetch(uri, location, e))?;
        self.add_document(Document::new(value, uri.clone()));
        Ok(())
    }

    fn load_target(
        &mut self,
        target: Target,
        reference: &str,
        location: &SchemaLocation,
    ) -> LoadResult<SchemaId> {
        let limit = self.config().max_reference_depth;
        if self.reference_depth >= limit {
            return Err(LoadError::ReferenceDepthExceeded {
                location: location.to_string(),
                limit,
            });
        }

        let document = self.documents.get(&target.document).cloned().ok_or_else(|| {
            ReferenceResolutionError::unresolvable_pointer(
                &target.document,
                &target.pointer.to_string(),
                location,
                "document is not loaded",
            )
        })?;
        let value = target.pointer.resolve(&document.value).map_err(|e| {
            ReferenceResolutionError::unresolvable_pointer(
                &target.document,
                &target.pointer.to_string(),
                location,
                e,
            )
        })?;
        if !matches!(value, Value::Object(_) | Value::Bool(_)) {
            return Err(ReferenceResolutionError::WrongKind {
                reference: reference.to_string(),
                location: location.to_string(),
                actual: ValueKind::of(value),
            }
            .into());
        }

        let frame = Frame {
            scope: enclosing_scope(&document, &target.pointer),
            document: target.document,
            pointer: target.pointer,
        };
        self.reference_depth += 1;
        let result = self.load_subschema(value, frame);
        self.reference_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fetcher::InMemoryFetcher;
    use crate::schema::Criterion;
    use serde_json::json;

    fn load(document: Value) -> CompiledSchema {
        SchemaLoader::new().load(&document, DEFAULT_BASE_URI).unwrap()
    }

    #[test]
    fn test_boolean_and_empty_schemas() {
        assert!(matches!(load(json!(true)).root_node().schema, Schema::Empty));
        assert!(matches!(load(json!(false)).root_node().schema, Schema::False));
        assert!(matches!(load(json!({"title": "x"})).root_node().schema, Schema::Empty));
        assert_eq!(
            load(json!({"title": "x"})).root_node().metadata.title.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_metadata_must_be_strings() {
        let schema = load(json!({"title": "t", "description": "d"}));
        assert_eq!(schema.root_node().metadata.description.as_deref(), Some("d"));

        let error = SchemaLoader::new()
            .load(&json!({"description": 7}), DEFAULT_BASE_URI)
            .unwrap_err();
        match error {
            LoadError::TypeMismatch(mismatch) => {
                assert_eq!(mismatch.keyword, "description");
                assert_eq!(mismatch.expected, vec![ValueKind::String]);
                assert_eq!(mismatch.actual, ValueKind::Number);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_base_uri() {
        let error = SchemaLoader::new().load(&json!({}), "relative/path").unwrap_err();
        assert!(matches!(error, LoadError::InvalidBaseUri { .. }));
    }

    #[test]
    fn test_sibling_groups_join_in_synthetic_all_of() {
        let schema = load(json!({"minLength": 2, "enum": ["ab", "c"], "title": "t"}));
        match &schema.root_node().schema {
            Schema::Combined(combined) => {
                assert_eq!(combined.criterion(), Criterion::AllOf);
                assert!(combined.is_synthetic());
                assert_eq!(combined.subschemas().len(), 2);
            }
            other => panic!("expected combined schema, got {}", other.variant_name()),
        }
        assert_eq!(schema.root_node().metadata.title.as_deref(), Some("t"));
        assert!(schema.is_valid(&json!("ab")));
        assert!(!schema.is_valid(&json!("c")));
    }

    #[test]
    fn test_self_reference_reuses_root_slot() {
        let schema = load(json!({
            "type": "object",
            "properties": {"child": {"$ref": "#"}}
        }));
        let reference = schema
            .find(|s| matches!(s, Schema::Reference(_)))
            .unwrap();
        match &schema.node(reference).schema {
            Schema::Reference(r) => {
                assert_eq!(r.target(), schema.root());
                assert_eq!(r.canonical_uri(), "mem://root#");
            }
            _ => unreachable!(),
        }
        assert!(schema.is_valid(&json!({"child": {"child": {}}})));
        assert!(!schema.is_valid(&json!({"child": {"child": 3}})));
    }

    #[test]
    fn test_plain_name_fragment() {
        let schema = load(json!({
            "definitions": {"pos": {"$id": "#positive", "minimum": 0}},
            "$ref": "#positive"
        }));
        assert!(schema.is_valid(&json!(3)));
        assert!(!schema.is_valid(&json!(-3)));
    }

    #[test]
    fn test_id_changes_resolution_scope() {
        let fetcher = InMemoryFetcher::new()
            .with_document("http://example.com/nested/item.json", json!({"type": "integer"}));
        let loader = SchemaLoader::new().with_fetcher(fetcher);
        let schema = loader
            .load(
                &json!({
                    "$id": "http://example.com/root.json",
                    "properties": {
                        "item": {"$id": "nested/", "$ref": "item.json"}
                    }
                }),
                DEFAULT_BASE_URI,
            )
            .unwrap();
        assert!(schema.is_valid(&json!({"item": 1})));
        assert!(!schema.is_valid(&json!({"item": "one"})));
    }

    #[test]
    fn test_unresolvable_pointer() {
        let error = SchemaLoader::new()
            .load(&json!({"$ref": "#/definitions/missing"}), DEFAULT_BASE_URI)
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Reference(ReferenceResolutionError::UnresolvablePointer { .. })
        ));
        assert_eq!(error.location(), Some("mem://root#"));
    }

    #[test]
    fn test_reference_to_non_schema() {
        let error = SchemaLoader::new()
            .load(&json!({"definitions": {"n": 5}, "$ref": "#/definitions/n"}), DEFAULT_BASE_URI)
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Reference(ReferenceResolutionError::WrongKind { actual: ValueKind::Number, .. })
        ));
    }

    #[test]
    fn test_reference_depth_limit() {
        let loader = SchemaLoader::with_config(LoaderConfig::default().with_max_reference_depth(2));
        let document = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/c"},
                "c": {"$ref": "#/definitions/d"},
                "d": {"type": "string"}
            },
            "$ref": "#/definitions/a"
        });
        let error = loader.load(&document, DEFAULT_BASE_URI).unwrap_err();
        assert!(matches!(error, LoadError::ReferenceDepthExceeded { limit: 2, .. }));
        assert!(SchemaLoader::new().load(&document, DEFAULT_BASE_URI).is_ok());
    }

    #[test]
    fn test_load_str_reports_parse_errors() {
        let error = SchemaLoader::new().load_str("{", DEFAULT_BASE_URI).unwrap_err();
        assert!(matches!(error, LoadError::Parse(_)));
    }
}
