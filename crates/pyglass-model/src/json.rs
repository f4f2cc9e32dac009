//! JSON (de)serialization of the object model.
//!
//! Entities are keyed by a `kind` discriminator, expressions by `cls`.
//! The base mode emits only the fields required to reconstruct the tree;
//! the full mode adds computed fields for consumers that do not
//! reimplement the model. Maps are emitted with sorted keys and members as
//! ordered arrays, so equal trees always produce byte-identical output.

use serde_json::{json, Map, Value};

use crate::error::DecodeError;
use crate::expr::{Expr, Parameters, TypeParameter};
use crate::object::{
    AliasData, Analysis, AttributeData, ClassData, ExportItem, FunctionData, Kind,
    ModuleCollection, ModuleData, Object, ObjectKind, TypeAliasData,
};

/// Encoder for object trees and whole collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    full: bool,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit all computed fields instead of the minimal base set.
    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn encode(&self, object: &Object) -> Value {
        object_to_value(object, self.full)
    }

    pub fn encode_string(&self, object: &Object) -> String {
        self.encode(object).to_string()
    }

    /// Multi-package dump shape: package name -> root entity.
    pub fn encode_collection(&self, collection: &ModuleCollection) -> Value {
        let mut map = Map::new();
        for root in collection.roots() {
            map.insert(root.name.clone(), self.encode(root));
        }
        Value::Object(map)
    }
}

impl Object {
    /// JSON value of this entity; `full` adds computed fields.
    pub fn as_value(&self, full: bool) -> Value {
        object_to_value(self, full)
    }

    /// Rebuilds an entity tree from its JSON form.
    pub fn from_value(value: &Value) -> Result<Object, DecodeError> {
        decode_object(value)
    }
}

fn object_to_value(object: &Object, full: bool) -> Value {
    let mut map = Map::new();
    map.insert("kind".into(), json!(object.kind().as_str()));
    map.insert("name".into(), json!(object.name));
    if let Some(lineno) = object.lineno {
        map.insert("lineno".into(), json!(lineno));
    }
    if let Some(endlineno) = object.endlineno {
        map.insert("endlineno".into(), json!(endlineno));
    }
    if let Some(docstring) = &object.docstring {
        map.insert("docstring".into(), serde_to_value(docstring));
    }
    if !object.labels.is_empty() {
        map.insert("labels".into(), json!(object.labels));
    }
    if object.analysis == Analysis::Dynamic {
        map.insert("analysis".into(), serde_to_value(&object.analysis));
    }
    if !object.runtime {
        map.insert("runtime".into(), json!(false));
    }
    if let Some(public) = object.public {
        map.insert("public".into(), json!(public));
    }
    if object.deprecated {
        map.insert("deprecated".into(), json!(true));
    }
    if !object.extra.is_empty() {
        map.insert("extra".into(), serde_to_value(&object.extra));
    }
    if !object.members.is_empty() {
        let members: Vec<Value> = object
            .members
            .values()
            .map(|member| object_to_value(member, full))
            .collect();
        map.insert("members".into(), Value::Array(members));
    }
    match &object.kind {
        ObjectKind::Module(data) => encode_module(&mut map, data),
        ObjectKind::Class(data) => encode_class(&mut map, data, full),
        ObjectKind::Function(data) => encode_function(&mut map, data, full),
        ObjectKind::Attribute(data) => encode_attribute(&mut map, data, full),
        ObjectKind::TypeAlias(data) => encode_type_alias(&mut map, data),
        ObjectKind::Alias(data) => encode_alias(&mut map, data, full),
    }
    if full {
        map.insert("path".into(), json!(object.path));
        if let Some(parent) = &object.parent {
            map.insert("parent".into(), json!(parent));
        }
        if !object.aliases.is_empty() {
            map.insert("aliases".into(), json!(object.aliases));
        }
    }
    Value::Object(map)
}

fn encode_module(map: &mut Map<String, Value>, data: &ModuleData) {
    if let Some(filepath) = &data.filepath {
        map.insert("filepath".into(), json!(filepath.display().to_string()));
    }
    if !data.imports.is_empty() {
        let mut imports = Map::new();
        for (name, target) in &data.imports {
            imports.insert(name.clone(), json!(target));
        }
        map.insert("imports".into(), Value::Object(imports));
    }
    if let Some(exports) = &data.exports {
        map.insert("exports".into(), serde_to_value(exports));
    }
    if data.is_init {
        map.insert("init".into(), json!(true));
    }
}

fn encode_class(map: &mut Map<String, Value>, data: &ClassData, full: bool) {
    if !data.bases.is_empty() {
        map.insert("bases".into(), serde_to_value(&data.bases));
    }
    if !data.keywords.is_empty() {
        map.insert("keywords".into(), serde_to_value(&data.keywords));
    }
    if !data.decorators.is_empty() {
        map.insert("decorators".into(), serde_to_value(&data.decorators));
    }
    if !data.type_parameters.is_empty() {
        map.insert("type_parameters".into(), serde_to_value(&data.type_parameters));
    }
    if let Some(parameters) = &data.parameters {
        map.insert("parameters".into(), serde_to_value(parameters));
    }
    if !data.overloads.is_empty() {
        let mut overloads = Map::new();
        for (name, signatures) in &data.overloads {
            let values: Vec<Value> = signatures.iter().map(|o| object_to_value(o, full)).collect();
            overloads.insert(name.clone(), Value::Array(values));
        }
        map.insert("overloads".into(), Value::Object(overloads));
    }
}

fn encode_function(map: &mut Map<String, Value>, data: &FunctionData, full: bool) {
    map.insert("parameters".into(), serde_to_value(&data.parameters));
    if let Some(returns) = &data.returns {
        map.insert("returns".into(), serde_to_value(returns));
    }
    if !data.decorators.is_empty() {
        map.insert("decorators".into(), serde_to_value(&data.decorators));
    }
    if !data.type_parameters.is_empty() {
        map.insert("type_parameters".into(), serde_to_value(&data.type_parameters));
    }
    if !data.overloads.is_empty() {
        let overloads: Vec<Value> = data
            .overloads
            .iter()
            .map(|o| object_to_value(o, full))
            .collect();
        map.insert("overloads".into(), Value::Array(overloads));
    }
    if let Some(setter) = &data.setter {
        map.insert("setter".into(), object_to_value(setter, full));
    }
    if let Some(deleter) = &data.deleter {
        map.insert("deleter".into(), object_to_value(deleter, full));
    }
}

fn encode_attribute(map: &mut Map<String, Value>, data: &AttributeData, full: bool) {
    if let Some(annotation) = &data.annotation {
        map.insert("annotation".into(), serde_to_value(annotation));
    }
    if let Some(value) = &data.value {
        map.insert("value".into(), serde_to_value(value));
    }
    if let Some(setter) = &data.setter {
        map.insert("setter".into(), object_to_value(setter, full));
    }
    if let Some(deleter) = &data.deleter {
        map.insert("deleter".into(), object_to_value(deleter, full));
    }
}

fn encode_type_alias(map: &mut Map<String, Value>, data: &TypeAliasData) {
    map.insert("value".into(), serde_to_value(&data.value));
    if !data.type_parameters.is_empty() {
        map.insert("type_parameters".into(), serde_to_value(&data.type_parameters));
    }
}

fn encode_alias(map: &mut Map<String, Value>, data: &AliasData, full: bool) {
    map.insert("target_path".into(), json!(data.target));
    if data.wildcard {
        map.insert("wildcard".into(), json!(true));
    }
    if data.inherited {
        map.insert("inherited".into(), json!(true));
    }
    if full {
        map.insert("resolved".into(), json!(data.resolved.is_some()));
        if let Some(resolved) = &data.resolved {
            map.insert("resolved_target".into(), json!(resolved));
        }
    }
}

fn serde_to_value<T: serde::Serialize>(value: &T) -> Value {
    // Model types serialize infallibly (no non-string map keys, no
    // non-finite floats reach this path).
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Decodes a root entity. Paths and parent links are rebuilt from the
/// nesting structure, so the base form stays minimal.
pub fn decode_object(value: &Value) -> Result<Object, DecodeError> {
    decode_with_parent(value, None)
}

fn decode_with_parent(value: &Value, parent: Option<&str>) -> Result<Object, DecodeError> {
    let map = value
        .as_object()
        .ok_or_else(|| DecodeError::shape("object", "expected a JSON object"))?;
    let kind_str = required_str(map, "object", "kind")?;
    let kind = Kind::from_str(kind_str)
        .ok_or_else(|| DecodeError::UnknownKind(kind_str.to_string()))?;
    let name = required_str(map, kind.as_str(), "name")?.to_string();

    let data = match kind {
        Kind::Module => ObjectKind::Module(decode_module(map)?),
        Kind::Class => ObjectKind::Class(decode_class(map)?),
        Kind::Function => ObjectKind::Function(decode_function(map)?),
        Kind::Attribute => ObjectKind::Attribute(decode_attribute(map)?),
        Kind::TypeAlias => ObjectKind::TypeAlias(decode_type_alias(map)?),
        Kind::Alias => ObjectKind::Alias(decode_alias(map)?),
    };

    let mut object = Object::new(name, data);
    if let Some(parent) = parent {
        object.parent = Some(parent.to_string());
        object.path = format!("{parent}.{}", object.name);
    }
    object.lineno = map.get("lineno").and_then(Value::as_u64).map(|v| v as usize);
    object.endlineno = map
        .get("endlineno")
        .and_then(Value::as_u64)
        .map(|v| v as usize);
    if let Some(docstring) = map.get("docstring") {
        object.docstring = Some(serde_json::from_value(docstring.clone())?);
    }
    if let Some(labels) = map.get("labels") {
        object.labels = serde_json::from_value(labels.clone())?;
    }
    if let Some(analysis) = map.get("analysis") {
        object.analysis = serde_json::from_value(analysis.clone())?;
    }
    if let Some(runtime) = map.get("runtime").and_then(Value::as_bool) {
        object.runtime = runtime;
    }
    if let Some(public) = map.get("public").and_then(Value::as_bool) {
        object.public = Some(public);
    }
    if map.get("deprecated").and_then(Value::as_bool) == Some(true) {
        object.deprecated = true;
    }
    if let Some(extra) = map.get("extra") {
        object.extra = serde_json::from_value(extra.clone())?;
    }
    if let Some(members) = map.get("members") {
        let members = members
            .as_array()
            .ok_or_else(|| DecodeError::shape("members", "expected an array"))?;
        let path = object.path.clone();
        for member in members {
            let child = decode_with_parent(member, Some(&path))?;
            object.members.insert(child.name.clone(), child);
        }
    }
    Ok(object)
}

fn decode_module(map: &Map<String, Value>) -> Result<ModuleData, DecodeError> {
    let mut data = ModuleData::default();
    if let Some(filepath) = map.get("filepath").and_then(Value::as_str) {
        data.filepath = Some(filepath.into());
    }
    if let Some(imports) = map.get("imports") {
        let imports = imports
            .as_object()
            .ok_or_else(|| DecodeError::shape("imports", "expected an object"))?;
        for (name, target) in imports {
            let target = target
                .as_str()
                .ok_or_else(|| DecodeError::shape("imports", "expected string targets"))?;
            data.imports.insert(name.clone(), target.to_string());
        }
    }
    if let Some(exports) = map.get("exports") {
        let items: Vec<ExportItem> = serde_json::from_value(exports.clone())?;
        data.exports = Some(items);
    }
    data.is_init = map.get("init").and_then(Value::as_bool) == Some(true);
    Ok(data)
}

fn decode_class(map: &Map<String, Value>) -> Result<ClassData, DecodeError> {
    let mut data = ClassData::default();
    if let Some(bases) = map.get("bases") {
        data.bases = decode_exprs(bases)?;
    }
    if let Some(keywords) = map.get("keywords") {
        data.keywords = decode_exprs(keywords)?;
    }
    if let Some(decorators) = map.get("decorators") {
        data.decorators = serde_json::from_value(decorators.clone())?;
    }
    if let Some(type_parameters) = map.get("type_parameters") {
        data.type_parameters = decode_type_parameters(type_parameters)?;
    }
    if let Some(parameters) = map.get("parameters") {
        data.parameters = Some(decode_parameters(parameters)?);
    }
    if let Some(overloads) = map.get("overloads") {
        let overloads = overloads
            .as_object()
            .ok_or_else(|| DecodeError::shape("overloads", "expected an object"))?;
        for (name, signatures) in overloads {
            let signatures = signatures
                .as_array()
                .ok_or_else(|| DecodeError::shape("overloads", "expected arrays of objects"))?;
            let decoded: Result<Vec<Object>, DecodeError> =
                signatures.iter().map(decode_object).collect();
            data.overloads.insert(name.clone(), decoded?);
        }
    }
    Ok(data)
}

fn decode_function(map: &Map<String, Value>) -> Result<FunctionData, DecodeError> {
    let mut data = FunctionData::default();
    let parameters = map
        .get("parameters")
        .ok_or_else(|| DecodeError::missing("function", "parameters"))?;
    data.parameters = decode_parameters(parameters)?;
    if let Some(returns) = map.get("returns") {
        data.returns = Some(decode_expr(returns)?);
    }
    if let Some(decorators) = map.get("decorators") {
        data.decorators = serde_json::from_value(decorators.clone())?;
    }
    if let Some(type_parameters) = map.get("type_parameters") {
        data.type_parameters = decode_type_parameters(type_parameters)?;
    }
    if let Some(overloads) = map.get("overloads") {
        let overloads = overloads
            .as_array()
            .ok_or_else(|| DecodeError::shape("overloads", "expected an array"))?;
        data.overloads = overloads
            .iter()
            .map(decode_object)
            .collect::<Result<_, _>>()?;
    }
    if let Some(setter) = map.get("setter") {
        data.setter = Some(Box::new(decode_object(setter)?));
    }
    if let Some(deleter) = map.get("deleter") {
        data.deleter = Some(Box::new(decode_object(deleter)?));
    }
    Ok(data)
}

fn decode_attribute(map: &Map<String, Value>) -> Result<AttributeData, DecodeError> {
    let mut data = AttributeData::default();
    if let Some(annotation) = map.get("annotation") {
        data.annotation = Some(decode_expr(annotation)?);
    }
    if let Some(value) = map.get("value") {
        data.value = Some(decode_expr(value)?);
    }
    if let Some(setter) = map.get("setter") {
        data.setter = Some(Box::new(decode_object(setter)?));
    }
    if let Some(deleter) = map.get("deleter") {
        data.deleter = Some(Box::new(decode_object(deleter)?));
    }
    Ok(data)
}

fn decode_type_alias(map: &Map<String, Value>) -> Result<TypeAliasData, DecodeError> {
    let value = map
        .get("value")
        .ok_or_else(|| DecodeError::missing("type_alias", "value"))?;
    let mut data = TypeAliasData {
        value: decode_expr(value)?,
        type_parameters: Vec::new(),
    };
    if let Some(type_parameters) = map.get("type_parameters") {
        data.type_parameters = decode_type_parameters(type_parameters)?;
    }
    Ok(data)
}

fn decode_alias(map: &Map<String, Value>) -> Result<AliasData, DecodeError> {
    let target = required_str(map, "alias", "target_path")?;
    let mut data = AliasData::new(target);
    data.wildcard = map.get("wildcard").and_then(Value::as_bool) == Some(true);
    data.inherited = map.get("inherited").and_then(Value::as_bool) == Some(true);
    if let Some(resolved) = map.get("resolved_target").and_then(Value::as_str) {
        data.resolved = Some(resolved.to_string());
    }
    Ok(data)
}

fn decode_expr(value: &Value) -> Result<Expr, DecodeError> {
    serde_json::from_value(value.clone()).map_err(DecodeError::Expression)
}

fn decode_exprs(value: &Value) -> Result<Vec<Expr>, DecodeError> {
    let values = value
        .as_array()
        .ok_or_else(|| DecodeError::shape("expressions", "expected an array"))?;
    values.iter().map(decode_expr).collect()
}

fn decode_parameters(value: &Value) -> Result<Parameters, DecodeError> {
    serde_json::from_value(value.clone()).map_err(DecodeError::Expression)
}

fn decode_type_parameters(value: &Value) -> Result<Vec<TypeParameter>, DecodeError> {
    serde_json::from_value(value.clone()).map_err(DecodeError::Expression)
}

fn required_str<'a>(
    map: &'a Map<String, Value>,
    kind: &'static str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    map.get(field)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingField { kind, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Parameter, ParameterKind};

    fn sample_tree() -> Object {
        let mut module = Object::module("pkg");
        if let ObjectKind::Module(data) = &mut module.kind {
            data.filepath = Some("/src/pkg/__init__.py".into());
            data.is_init = true;
            data.imports
                .insert("os".to_string(), "os".to_string());
            data.exports = Some(vec![ExportItem::Literal("greet".to_string())]);
        }
        let mut function = FunctionData::default();
        function
            .parameters
            .push(Parameter::new("name", ParameterKind::PositionalOrKeyword));
        let mut prefix = Parameter::new("prefix", ParameterKind::PositionalOrKeyword);
        prefix.default = Some(Box::new(Expr::constant("'hello'")));
        function.parameters.push(prefix);
        function.returns = Some(Expr::name("str", Some("pkg".to_string())));
        let greet = Object::new("greet", ObjectKind::Function(function)).with_lines(3, 5);
        module.set_member("greet", greet);
        module.set_member("VERSION", {
            let mut attribute = AttributeData::default();
            attribute.value = Some(Expr::constant("'1.0'"));
            Object::new("VERSION", ObjectKind::Attribute(attribute)).with_lines(1, 1)
        });
        module
    }

    #[test]
    fn test_base_round_trip_is_byte_identical() {
        let tree = sample_tree();
        let encoder = JsonEncoder::new();
        let first = encoder.encode_string(&tree);
        let decoded = decode_object(&serde_json::from_str(&first).unwrap()).unwrap();
        let second = encoder.encode_string(&decoded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_round_trip_re_encodes_equal() {
        let tree = sample_tree();
        let encoder = JsonEncoder::new().full(true);
        let first = encoder.encode_string(&tree);
        let decoded = decode_object(&serde_json::from_str(&first).unwrap()).unwrap();
        let second = encoder.encode_string(&decoded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_rebuilds_paths() {
        let tree = sample_tree();
        let value = JsonEncoder::new().encode(&tree);
        let decoded = decode_object(&value).unwrap();
        let greet = decoded.get_member("greet").unwrap();
        assert_eq!(greet.path, "pkg.greet");
        assert_eq!(greet.parent.as_deref(), Some("pkg"));
        assert_eq!(greet.lineno, Some(3));
    }

    #[test]
    fn test_member_order_survives_round_trip() {
        let tree = sample_tree();
        let value = JsonEncoder::new().encode(&tree);
        let decoded = decode_object(&value).unwrap();
        let names: Vec<&String> = decoded.members.keys().collect();
        assert_eq!(names, vec!["greet", "VERSION"]);
    }

    #[test]
    fn test_unknown_kind_fails_loudly() {
        let value = json!({"kind": "gadget", "name": "x"});
        let err = decode_object(&value).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownKind(k) if k == "gadget"));
    }

    #[test]
    fn test_missing_name_fails_loudly() {
        let value = json!({"kind": "module"});
        let err = decode_object(&value).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "name", .. }));
    }

    #[test]
    fn test_alias_base_fields() {
        let mut module = Object::module("pkg");
        let mut alias = Object::alias("X", "other.X");
        if let ObjectKind::Alias(data) = &mut alias.kind {
            data.wildcard = true;
        }
        module.set_member("X", alias);
        let value = JsonEncoder::new().encode(&module);
        let member = &value["members"][0];
        assert_eq!(member["kind"], "alias");
        assert_eq!(member["target_path"], "other.X");
        assert_eq!(member["wildcard"], true);
        assert!(member.get("resolved").is_none());
    }

    #[test]
    fn test_collection_dump_shape() {
        let mut collection = ModuleCollection::new();
        collection.insert(Object::module("alpha"));
        collection.insert(Object::module("beta"));
        let dump = JsonEncoder::new().encode_collection(&collection);
        assert!(dump.get("alpha").is_some());
        assert!(dump.get("beta").is_some());
        assert_eq!(dump["alpha"]["kind"], "module");
    }
}
