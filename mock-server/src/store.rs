//! In-memory PI AF / Data Archive hierarchy.
//!
//! Nodes keep only their own fields and a parent link; paths are derived
//! from the parent chain on every render so renames show up everywhere.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    AssetServer,
    AssetDatabase,
    Element,
    ElementTemplate,
    Attribute,
    AttributeTemplate,
    DataServer,
    Point,
    EventFrame,
}

/// Fields every render fills in itself; writes to them are ignored.
const SERVER_OWNED: &[&str] = &[
    "WebId",
    "Id",
    "Path",
    "Links",
    "HasChildren",
    "IsConnected",
    "ServerVersion",
    "AcknowledgedBy",
    "IsAcknowledged",
    "CanBeAcknowledged",
];

impl Kind {
    pub const ALL: [Kind; 9] = [
        Kind::AssetServer,
        Kind::AssetDatabase,
        Kind::Element,
        Kind::ElementTemplate,
        Kind::Attribute,
        Kind::AttributeTemplate,
        Kind::DataServer,
        Kind::Point,
        Kind::EventFrame,
    ];

    pub fn collection(self) -> &'static str {
        match self {
            Kind::AssetServer => "assetservers",
            Kind::AssetDatabase => "assetdatabases",
            Kind::Element => "elements",
            Kind::ElementTemplate => "elementtemplates",
            Kind::Attribute => "attributes",
            Kind::AttributeTemplate => "attributetemplates",
            Kind::DataServer => "dataservers",
            Kind::Point => "points",
            Kind::EventFrame => "eventframes",
        }
    }

    pub fn from_collection(collection: &str) -> Option<Kind> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.collection().eq_ignore_ascii_case(collection))
    }

    pub fn is_root(self) -> bool {
        matches!(self, Kind::AssetServer | Kind::DataServer)
    }

    pub fn has_stream(self) -> bool {
        matches!(self, Kind::Attribute | Kind::Point)
    }

    fn web_id_prefix(self) -> &'static str {
        match self {
            Kind::AssetServer => "F1RS",
            Kind::AssetDatabase => "F1RD",
            Kind::Element => "F1Em",
            Kind::ElementTemplate => "F1ET",
            Kind::Attribute => "F1Ab",
            Kind::AttributeTemplate => "F1AT",
            Kind::DataServer => "F1DS",
            Kind::Point => "F1DP",
            Kind::EventFrame => "F1Fm",
        }
    }

    /// `(url segment, child kind, link name)` for each child collection.
    pub fn children(self) -> &'static [(&'static str, Kind, &'static str)] {
        match self {
            Kind::AssetServer => &[("assetdatabases", Kind::AssetDatabase, "Databases")],
            Kind::AssetDatabase => &[
                ("elements", Kind::Element, "Elements"),
                ("elementtemplates", Kind::ElementTemplate, "ElementTemplates"),
                ("eventframes", Kind::EventFrame, "EventFrames"),
            ],
            Kind::Element => &[
                ("elements", Kind::Element, "Elements"),
                ("attributes", Kind::Attribute, "Attributes"),
            ],
            Kind::ElementTemplate => &[("attributetemplates", Kind::AttributeTemplate, "AttributeTemplates")],
            Kind::Attribute => &[("attributes", Kind::Attribute, "Attributes")],
            Kind::AttributeTemplate => &[],
            Kind::DataServer => &[("points", Kind::Point, "Points")],
            Kind::Point => &[],
            Kind::EventFrame => &[("eventframes", Kind::EventFrame, "EventFrames")],
        }
    }

    pub fn child_kind(self, segment: &str) -> Option<Kind> {
        self.children()
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(segment))
            .map(|(_, kind, _)| *kind)
    }

    /// Client-writable fields.
    fn writable(self) -> &'static [&'static str] {
        match self {
            Kind::AssetServer => &["Name", "Description", "ExtendedProperties"],
            Kind::AssetDatabase => &["Name", "Description", "ExtendedProperties"],
            Kind::Element => &["Name", "Description", "TemplateName", "CategoryNames", "ExtendedProperties"],
            Kind::ElementTemplate => &[
                "Name",
                "Description",
                "AllowElementToExtend",
                "BaseTemplate",
                "InstanceType",
                "NamingPattern",
                "CategoryNames",
                "ExtendedProperties",
            ],
            Kind::Attribute => &[
                "Name",
                "Description",
                "Type",
                "TypeQualifier",
                "DefaultUnitsName",
                "DataReferencePlugIn",
                "ConfigString",
                "IsConfigurationItem",
                "IsExcluded",
                "IsHidden",
                "IsManualDataEntry",
                "CategoryNames",
                "Step",
            ],
            Kind::AttributeTemplate => &[
                "Name",
                "Description",
                "Type",
                "TypeQualifier",
                "DefaultUnitsName",
                "DefaultValue",
                "DataReferencePlugIn",
                "ConfigString",
                "IsConfigurationItem",
                "IsExcluded",
                "IsHidden",
                "IsManualDataEntry",
                "CategoryNames",
            ],
            Kind::DataServer => &["Name"],
            Kind::Point => &[
                "Name",
                "Descriptor",
                "PointClass",
                "PointType",
                "DigitalSetName",
                "EngineeringUnits",
                "Span",
                "Zero",
                "Step",
                "Future",
                "DisplayDigits",
            ],
            Kind::EventFrame => &[
                "Name",
                "Description",
                "TemplateName",
                "CategoryNames",
                "StartTime",
                "EndTime",
                "Severity",
                "ExtendedProperties",
            ],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::AssetServer => "asset server",
            Kind::AssetDatabase => "database",
            Kind::Element => "element",
            Kind::ElementTemplate => "element template",
            Kind::Attribute => "attribute",
            Kind::AttributeTemplate => "attribute template",
            Kind::DataServer => "data server",
            Kind::Point => "point",
            Kind::EventFrame => "event frame",
        }
    }
}

/// Why a write was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound(String),
    BadRequest(String),
    /// Unknown fields in a request body: `(field, message)`.
    InvalidFields(Vec<(String, String)>),
    Conflict(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    parent: Option<String>,
    seq: u64,
    fields: Map<String, Value>,
    value: Option<Value>,
}

impl Node {
    fn name(&self) -> &str {
        self.fields.get("Name").and_then(Value::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    nodes: HashMap<String, Node>,
    next_seq: u64,
}

impl Store {
    /// A small plant: one AF server with a pump hierarchy, one data server
    /// with two points.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        let af = store.insert(
            Kind::AssetServer,
            None,
            json!({ "Name": "PISRV1", "Description": "Plant AF server" }),
        );
        let db = store.insert(
            Kind::AssetDatabase,
            Some(&af),
            json!({ "Name": "Database1", "Description": "Plant model" }),
        );
        let template = store.insert(
            Kind::ElementTemplate,
            Some(&db),
            json!({ "Name": "Pump", "Description": "Centrifugal pump", "AllowElementToExtend": true, "InstanceType": "Element" }),
        );
        store.insert(
            Kind::AttributeTemplate,
            Some(&template),
            json!({ "Name": "Flow", "Type": "Double", "DefaultUnitsName": "m3/h", "DataReferencePlugIn": "PI Point" }),
        );
        store.insert(
            Kind::AttributeTemplate,
            Some(&template),
            json!({ "Name": "Status", "Type": "String", "DefaultValue": "Stopped" }),
        );
        let plant = store.insert(Kind::Element, Some(&db), json!({ "Name": "Plant", "Description": "Site root" }));
        let pump = store.insert(
            Kind::Element,
            Some(&plant),
            json!({ "Name": "Pump01", "Description": "Feed pump", "TemplateName": "Pump", "CategoryNames": ["Rotating"] }),
        );
        let flow = store.insert(
            Kind::Attribute,
            Some(&pump),
            json!({
                "Name": "Flow",
                "Type": "Double",
                "DefaultUnitsName": "m3/h",
                "DataReferencePlugIn": "PI Point",
                "ConfigString": "\\\\PISRV1\\sinusoid"
            }),
        );
        store.set_value(&flow, json!({ "Timestamp": "2024-01-01T00:00:00Z", "Value": 12.5, "UnitsAbbreviation": "m3/h" }));
        let status = store.insert(
            Kind::Attribute,
            Some(&pump),
            json!({ "Name": "Status", "Type": "String", "IsManualDataEntry": true }),
        );
        store.set_value(&status, json!({ "Timestamp": "2024-01-01T00:00:00Z", "Value": "Running" }));
        store.insert(
            Kind::EventFrame,
            Some(&db),
            json!({ "Name": "Startup", "StartTime": "2024-01-01T06:00:00Z", "EndTime": "2024-01-01T06:30:00Z", "Severity": "Information" }),
        );

        let archive = store.insert(Kind::DataServer, None, json!({ "Name": "PISRV1" }));
        let sinusoid = store.insert(
            Kind::Point,
            Some(&archive),
            json!({
                "Name": "sinusoid",
                "Descriptor": "12 Hour Sine Wave",
                "PointClass": "classic",
                "PointType": "Float32",
                "EngineeringUnits": "",
                "Span": 100.0,
                "Zero": 0.0,
                "Step": false,
                "Future": false,
                "DisplayDigits": -5
            }),
        );
        store.set_value(&sinusoid, json!({ "Timestamp": "2024-01-01T00:00:00Z", "Value": 50.0 }));
        store.insert(
            Kind::Point,
            Some(&archive),
            json!({ "Name": "cdt158", "Descriptor": "Atmospheric Tower OH Vapor", "PointClass": "classic", "PointType": "Float32", "EngineeringUnits": "DEG. C" }),
        );
        store
    }

    fn insert(&mut self, kind: Kind, parent: Option<&str>, fields: Value) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        let web_id = format!("{}{}", kind.web_id_prefix(), Uuid::new_v4().simple());
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match kind {
            Kind::Point => json!(seq),
            _ => json!(Uuid::new_v4().to_string()),
        };
        fields.insert("Id".to_string(), id);
        self.nodes.insert(
            web_id.clone(),
            Node {
                kind,
                parent: parent.map(str::to_string),
                seq,
                fields,
                value: None,
            },
        );
        web_id
    }

    fn set_value(&mut self, web_id: &str, value: Value) {
        if let Some(node) = self.nodes.get_mut(web_id) {
            node.value = Some(value);
        }
    }

    fn lookup(&self, kind: Kind, web_id: &str) -> Result<&Node, StoreError> {
        self.nodes
            .get(web_id)
            .filter(|node| node.kind == kind)
            .ok_or_else(|| StoreError::NotFound(format!("Unknown or invalid WebId '{web_id}' for {}.", kind.label())))
    }

    fn path_of(&self, web_id: &str) -> String {
        let Some(node) = self.nodes.get(web_id) else {
            return String::new();
        };
        let parent = node.parent.as_deref();
        let parent_path = || parent.map(|p| self.path_of(p)).unwrap_or_default();
        let name = node.name();
        match node.kind {
            Kind::AssetServer => format!("\\\\{name}"),
            Kind::AssetDatabase | Kind::Element => format!("{}\\{name}", parent_path()),
            Kind::ElementTemplate => format!("{}\\ElementTemplates[{name}]", parent_path()),
            Kind::Attribute | Kind::AttributeTemplate => format!("{}|{name}", parent_path()),
            Kind::DataServer => format!("\\\\PIServers[{name}]"),
            Kind::Point => {
                let server = parent
                    .and_then(|p| self.nodes.get(p))
                    .map(Node::name)
                    .unwrap_or_default();
                format!("\\\\{server}\\{name}")
            }
            Kind::EventFrame => format!("{}\\EventFrames[{name}]", parent_path()),
        }
    }

    fn children_of(&self, parent: &str, kind: Kind) -> Vec<(&String, &Node)> {
        let mut children: Vec<_> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.kind == kind && node.parent.as_deref() == Some(parent))
            .collect();
        children.sort_by_key(|(_, node)| node.seq);
        children
    }

    fn render(&self, base: &str, web_id: &str, node: &Node) -> Value {
        let mut out = Map::new();
        out.insert("WebId".to_string(), json!(web_id));
        for (key, value) in &node.fields {
            out.insert(key.clone(), value.clone());
        }
        out.insert("Path".to_string(), json!(self.path_of(web_id)));

        match node.kind {
            Kind::AssetServer => {
                out.insert("IsConnected".to_string(), json!(true));
                out.insert("ServerVersion".to_string(), json!("2.10.9.593"));
            }
            Kind::DataServer => {
                out.insert("IsConnected".to_string(), json!(true));
                out.insert("ServerVersion".to_string(), json!("3.4.440.477"));
            }
            Kind::Element | Kind::Attribute | Kind::EventFrame | Kind::AttributeTemplate => {
                let has_children = node
                    .kind
                    .children()
                    .iter()
                    .any(|(_, kind, _)| *kind == node.kind && !self.children_of(web_id, *kind).is_empty());
                out.insert("HasChildren".to_string(), json!(has_children));
            }
            _ => {}
        }

        let own = format!("{base}/{}/{web_id}", node.kind.collection());
        let mut links = Map::new();
        links.insert("Self".to_string(), json!(own));
        for (segment, _, label) in node.kind.children() {
            links.insert(label.to_string(), json!(format!("{own}/{segment}")));
        }
        if node.kind.has_stream() {
            links.insert("Value".to_string(), json!(format!("{base}/streams/{web_id}/value")));
        }
        out.insert("Links".to_string(), Value::Object(links));
        Value::Object(out)
    }

    pub fn get(&self, base: &str, kind: Kind, web_id: &str) -> Result<Value, StoreError> {
        let node = self.lookup(kind, web_id)?;
        Ok(self.render(base, web_id, node))
    }

    /// PI paths compare case-insensitively.
    pub fn get_by_path(&self, base: &str, kind: Kind, path: &str) -> Result<Value, StoreError> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.kind == kind)
            .find(|(web_id, _)| self.path_of(web_id).eq_ignore_ascii_case(path))
            .map(|(web_id, node)| self.render(base, web_id, node))
            .ok_or_else(|| StoreError::NotFound(format!("The specified path '{path}' was not found.")))
    }

    pub fn list_roots(&self, base: &str, kind: Kind) -> Value {
        let mut roots: Vec<_> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.kind == kind && node.parent.is_none())
            .collect();
        roots.sort_by_key(|(_, node)| node.seq);
        let items: Vec<Value> = roots
            .into_iter()
            .map(|(web_id, node)| self.render(base, web_id, node))
            .collect();
        page(items, format!("{base}/{}", kind.collection()))
    }

    pub fn list_children(&self, base: &str, kind: Kind, web_id: &str, segment: &str) -> Result<Value, StoreError> {
        self.lookup(kind, web_id)?;
        let child_kind = kind
            .child_kind(segment)
            .ok_or_else(|| StoreError::NotFound(format!("No '{segment}' collection under {}.", kind.label())))?;
        let items: Vec<Value> = self
            .children_of(web_id, child_kind)
            .into_iter()
            .map(|(id, node)| self.render(base, id, node))
            .collect();
        Ok(page(items, format!("{base}/{}/{web_id}/{segment}", kind.collection())))
    }

    /// Creates a child and returns its WebId.
    pub fn create_child(&mut self, kind: Kind, web_id: &str, segment: &str, body: Value) -> Result<(String, Kind), StoreError> {
        self.lookup(kind, web_id)?;
        let child_kind = kind
            .child_kind(segment)
            .ok_or_else(|| StoreError::NotFound(format!("No '{segment}' collection under {}.", kind.label())))?;
        let fields = writable_fields(child_kind, body)?;
        let name = fields
            .get("Name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| StoreError::BadRequest("The Name field is required.".to_string()))?
            .to_string();
        self.ensure_unique(web_id, child_kind, &name, None)?;
        let id = self.insert(child_kind, Some(web_id), Value::Object(fields));
        Ok((id, child_kind))
    }

    pub fn update(&mut self, kind: Kind, web_id: &str, body: Value) -> Result<(), StoreError> {
        let parent = self.lookup(kind, web_id)?.parent.clone();
        let fields = writable_fields(kind, body)?;
        if let Some(name) = fields.get("Name") {
            let name = name
                .as_str()
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| StoreError::BadRequest("Name must be a non-empty string.".to_string()))?;
            match &parent {
                Some(parent) => self.ensure_unique(parent, kind, name, Some(web_id))?,
                None => self.ensure_unique_root(kind, name, web_id)?,
            }
        }
        if let Some(node) = self.nodes.get_mut(web_id) {
            node.fields.extend(fields);
        }
        Ok(())
    }

    /// Deletes the node and everything below it.
    pub fn delete(&mut self, kind: Kind, web_id: &str) -> Result<(), StoreError> {
        self.lookup(kind, web_id)?;
        let mut pending = vec![web_id.to_string()];
        while let Some(id) = pending.pop() {
            pending.extend(
                self.nodes
                    .iter()
                    .filter(|(_, node)| node.parent.as_deref() == Some(id.as_str()))
                    .map(|(child, _)| child.clone()),
            );
            self.nodes.remove(&id);
        }
        Ok(())
    }

    fn stream_node(&self, web_id: &str) -> Result<&Node, StoreError> {
        self.nodes
            .get(web_id)
            .filter(|node| node.kind.has_stream())
            .ok_or_else(|| StoreError::NotFound(format!("Unknown or invalid WebId '{web_id}' for stream.")))
    }

    pub fn get_value(&self, web_id: &str) -> Result<Value, StoreError> {
        let node = self.stream_node(web_id)?;
        let mut value = match &node.value {
            Some(Value::Object(map)) => map.clone(),
            _ => {
                let mut map = Map::new();
                map.insert("Timestamp".to_string(), json!("1970-01-01T00:00:00Z"));
                map.insert("Value".to_string(), json!(0));
                map
            }
        };
        for flag in ["Good", "Questionable", "Substituted", "Annotated"] {
            value.entry(flag).or_insert(json!(flag == "Good"));
        }
        Ok(Value::Object(value))
    }

    pub fn update_value(&mut self, web_id: &str, body: Value) -> Result<(), StoreError> {
        self.stream_node(web_id)?;
        let Value::Object(mut map) = body else {
            return Err(StoreError::BadRequest("A timed value object is required.".to_string()));
        };
        if !map.contains_key("Value") {
            return Err(StoreError::BadRequest("The Value field is required.".to_string()));
        }
        // `*` is PI time syntax for now.
        let unresolved = match map.get("Timestamp") {
            None | Some(Value::Null) => true,
            Some(stamp) => stamp.as_str() == Some("*"),
        };
        if unresolved {
            map.insert(
                "Timestamp".to_string(),
                json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        self.set_value(web_id, Value::Object(map));
        Ok(())
    }

    fn ensure_unique(&self, parent: &str, kind: Kind, name: &str, except: Option<&str>) -> Result<(), StoreError> {
        let clash = self
            .children_of(parent, kind)
            .into_iter()
            .any(|(id, node)| Some(id.as_str()) != except && node.name().eq_ignore_ascii_case(name));
        if clash {
            return Err(StoreError::Conflict(format!("The {} '{name}' already exists.", kind.label())));
        }
        Ok(())
    }

    fn ensure_unique_root(&self, kind: Kind, name: &str, except: &str) -> Result<(), StoreError> {
        let clash = self.nodes.iter().any(|(id, node)| {
            node.kind == kind && node.parent.is_none() && id != except && node.name().eq_ignore_ascii_case(name)
        });
        if clash {
            return Err(StoreError::Conflict(format!("The {} '{name}' already exists.", kind.label())));
        }
        Ok(())
    }
}

/// Keeps writable fields, drops server-owned ones, rejects the rest.
fn writable_fields(kind: Kind, body: Value) -> Result<Map<String, Value>, StoreError> {
    let Value::Object(map) = body else {
        return Err(StoreError::BadRequest("The request body must be a JSON object.".to_string()));
    };
    let mut fields = Map::new();
    let mut invalid = Vec::new();
    for (key, value) in map {
        if let Some(canonical) = kind.writable().iter().find(|f| f.eq_ignore_ascii_case(&key)) {
            fields.insert(canonical.to_string(), value);
        } else if !SERVER_OWNED.iter().any(|f| f.eq_ignore_ascii_case(&key)) {
            let message = format!("'{key}' is not a writable {} field.", kind.label());
            invalid.push((key, message));
        }
    }
    if !invalid.is_empty() {
        return Err(StoreError::InvalidFields(invalid));
    }
    Ok(fields)
}

fn page(items: Vec<Value>, self_link: String) -> Value {
    json!({ "Items": items, "Links": { "Self": self_link } })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost/piwebapi";

    fn web_id_at(store: &Store, kind: Kind, path: &str) -> String {
        store.get_by_path(BASE, kind, path).unwrap()["WebId"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn seeded_paths_follow_pi_conventions() {
        let store = Store::seeded();
        for (kind, path) in [
            (Kind::AssetServer, r"\\PISRV1"),
            (Kind::AssetDatabase, r"\\PISRV1\Database1"),
            (Kind::ElementTemplate, r"\\PISRV1\Database1\ElementTemplates[Pump]"),
            (Kind::AttributeTemplate, r"\\PISRV1\Database1\ElementTemplates[Pump]|Flow"),
            (Kind::Element, r"\\PISRV1\Database1\Plant\Pump01"),
            (Kind::Attribute, r"\\PISRV1\Database1\Plant\Pump01|Flow"),
            (Kind::EventFrame, r"\\PISRV1\Database1\EventFrames[Startup]"),
            (Kind::DataServer, r"\\PIServers[PISRV1]"),
            (Kind::Point, r"\\PISRV1\sinusoid"),
        ] {
            assert!(store.get_by_path(BASE, kind, path).is_ok(), "{path}");
        }
    }

    #[test]
    fn path_lookup_ignores_case() {
        let store = Store::seeded();
        assert!(store.get_by_path(BASE, Kind::Element, r"\\pisrv1\database1\PLANT").is_ok());
    }

    #[test]
    fn web_id_of_wrong_kind_is_not_found() {
        let store = Store::seeded();
        let plant = web_id_at(&store, Kind::Element, r"\\PISRV1\Database1\Plant");
        assert!(store.get(BASE, Kind::Element, &plant).is_ok());
        assert!(matches!(store.get(BASE, Kind::Attribute, &plant), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn rename_moves_descendant_paths() {
        let mut store = Store::seeded();
        let plant = web_id_at(&store, Kind::Element, r"\\PISRV1\Database1\Plant");
        store.update(Kind::Element, &plant, json!({ "Name": "Site" })).unwrap();
        assert!(store
            .get_by_path(BASE, Kind::Attribute, r"\\PISRV1\Database1\Site\Pump01|Flow")
            .is_ok());
    }

    #[test]
    fn create_rejects_missing_name_and_duplicates() {
        let mut store = Store::seeded();
        let plant = web_id_at(&store, Kind::Element, r"\\PISRV1\Database1\Plant");
        assert!(matches!(
            store.create_child(Kind::Element, &plant, "elements", json!({})),
            Err(StoreError::BadRequest(_))
        ));
        assert!(matches!(
            store.create_child(Kind::Element, &plant, "elements", json!({ "Name": "pump01" })),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn update_reports_unknown_fields() {
        let mut store = Store::seeded();
        let plant = web_id_at(&store, Kind::Element, r"\\PISRV1\Database1\Plant");
        let err = store
            .update(Kind::Element, &plant, json!({ "Colour": "red", "WebId": "ignored" }))
            .unwrap_err();
        match err {
            StoreError::InvalidFields(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].0, "Colour");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delete_removes_subtree() {
        let mut store = Store::seeded();
        let plant = web_id_at(&store, Kind::Element, r"\\PISRV1\Database1\Plant");
        let flow = web_id_at(&store, Kind::Attribute, r"\\PISRV1\Database1\Plant\Pump01|Flow");
        store.delete(Kind::Element, &plant).unwrap();
        assert!(store.get(BASE, Kind::Attribute, &flow).is_err());
        assert!(store.get_value(&flow).is_err());
    }

    #[test]
    fn stream_values_default_quality_flags() {
        let mut store = Store::seeded();
        let point = web_id_at(&store, Kind::Point, r"\\PISRV1\cdt158");
        let value = store.get_value(&point).unwrap();
        assert_eq!(value["Value"], 0);
        assert_eq!(value["Good"], true);
        assert_eq!(value["Questionable"], false);

        store.update_value(&point, json!({ "Value": 99.5 })).unwrap();
        let value = store.get_value(&point).unwrap();
        assert_eq!(value["Value"], 99.5);
        let stamp = value["Timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
    }

    #[test]
    fn star_timestamp_resolves_to_write_time() {
        let mut store = Store::seeded();
        let point = web_id_at(&store, Kind::Point, r"\\PISRV1\sinusoid");
        let before = Utc::now().timestamp();
        store
            .update_value(&point, json!({ "Timestamp": "*", "Value": 1.0 }))
            .unwrap();
        let value = store.get_value(&point).unwrap();
        let stamp = value["Timestamp"].as_str().unwrap();
        assert_ne!(stamp, "*");
        let written = chrono::DateTime::parse_from_rfc3339(stamp).unwrap().timestamp();
        assert!(written >= before && written <= Utc::now().timestamp(), "{stamp}");

        store
            .update_value(&point, json!({ "Timestamp": "2024-05-01T00:00:00Z", "Value": 2.0 }))
            .unwrap();
        assert_eq!(store.get_value(&point).unwrap()["Timestamp"], "2024-05-01T00:00:00Z");
    }
}
