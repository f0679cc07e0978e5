//! PI Web API records.
//!
//! # Design
//! One record per server resource shape, all declared through `pi_object!`
//! so every field is optional and omitted from the JSON when unset. Records
//! never reference each other; relationships go through `WebId` strings.
//! Only the `Self` link gets a typed accessor; every other link stays in the
//! `PILinks` map under its server-assigned name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::pi_object;

/// The `Links` object attached to most records: link name to absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PILinks(pub BTreeMap<String, String>);

impl PILinks {
    pub fn self_link(&self) -> Option<&str> {
        self.get("Self")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// A page of records as returned by collection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIItems<T> {
    #[serde(rename = "Items", default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(rename = "Links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PILinks>,
}

impl<T> Default for PIItems<T> {
    fn default() -> Self {
        Self {
            items: None,
            links: None,
        }
    }
}

pi_object! {
    /// Root document served at the API base URL.
    pub struct PILanding {
        links: PILinks => "Links",
    }
}

pi_object! {
    /// Body of most PI Web API error responses.
    pub struct PIErrors {
        errors: Vec<String> => "Errors",
    }
}

pi_object! {
    /// Validation failure for a single field of a request body.
    pub struct PIPropertyError {
        field: String => "Field",
        message: Vec<String> => "Message",
    }
}

pi_object! {
    /// Wrapper PI uses for extended property values.
    pub struct PIValue {
        value: Value => "Value",
    }
}

pi_object! {
    /// An AF server.
    pub struct PIAssetServer {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        is_connected: bool => "IsConnected",
        server_version: String => "ServerVersion",
        extended_properties: BTreeMap<String, PIValue> => "ExtendedProperties",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIAssetDatabase {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        extended_properties: BTreeMap<String, PIValue> => "ExtendedProperties",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIElement {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        template_name: String => "TemplateName",
        has_children: bool => "HasChildren",
        category_names: Vec<String> => "CategoryNames",
        extended_properties: BTreeMap<String, PIValue> => "ExtendedProperties",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIElementTemplate {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        allow_element_to_extend: bool => "AllowElementToExtend",
        base_template: String => "BaseTemplate",
        /// AF object type instantiated from the template, e.g. `Element`.
        instance_type: String => "InstanceType",
        naming_pattern: String => "NamingPattern",
        category_names: Vec<String> => "CategoryNames",
        extended_properties: BTreeMap<String, PIValue> => "ExtendedProperties",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIAttribute {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        /// Value type name, e.g. `Double` or `EnumerationValue`.
        r#type: String => "Type",
        type_qualifier: String => "TypeQualifier",
        default_units_name: String => "DefaultUnitsName",
        data_reference_plug_in: String => "DataReferencePlugIn",
        config_string: String => "ConfigString",
        is_configuration_item: bool => "IsConfigurationItem",
        is_excluded: bool => "IsExcluded",
        is_hidden: bool => "IsHidden",
        is_manual_data_entry: bool => "IsManualDataEntry",
        has_children: bool => "HasChildren",
        category_names: Vec<String> => "CategoryNames",
        step: bool => "Step",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIAttributeTemplate {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        r#type: String => "Type",
        type_qualifier: String => "TypeQualifier",
        default_units_name: String => "DefaultUnitsName",
        default_value: Value => "DefaultValue",
        data_reference_plug_in: String => "DataReferencePlugIn",
        config_string: String => "ConfigString",
        is_configuration_item: bool => "IsConfigurationItem",
        is_excluded: bool => "IsExcluded",
        is_hidden: bool => "IsHidden",
        is_manual_data_entry: bool => "IsManualDataEntry",
        has_children: bool => "HasChildren",
        category_names: Vec<String> => "CategoryNames",
        links: PILinks => "Links",
    }
}

pi_object! {
    /// A PI Data Archive server.
    pub struct PIDataServer {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        path: String => "Path",
        is_connected: bool => "IsConnected",
        server_version: String => "ServerVersion",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIPoint {
        web_id: String => "WebId",
        /// Point id within its data server; numeric unlike AF ids.
        id: i64 => "Id",
        name: String => "Name",
        path: String => "Path",
        descriptor: String => "Descriptor",
        point_class: String => "PointClass",
        point_type: String => "PointType",
        digital_set_name: String => "DigitalSetName",
        engineering_units: String => "EngineeringUnits",
        span: f64 => "Span",
        zero: f64 => "Zero",
        step: bool => "Step",
        future: bool => "Future",
        display_digits: i32 => "DisplayDigits",
        links: PILinks => "Links",
    }
}

pi_object! {
    pub struct PIEventFrame {
        web_id: String => "WebId",
        id: String => "Id",
        name: String => "Name",
        description: String => "Description",
        path: String => "Path",
        template_name: String => "TemplateName",
        has_children: bool => "HasChildren",
        category_names: Vec<String> => "CategoryNames",
        start_time: String => "StartTime",
        end_time: String => "EndTime",
        severity: String => "Severity",
        acknowledged_by: String => "AcknowledgedBy",
        is_acknowledged: bool => "IsAcknowledged",
        can_be_acknowledged: bool => "CanBeAcknowledged",
        extended_properties: BTreeMap<String, PIValue> => "ExtendedProperties",
        links: PILinks => "Links",
    }
}

pi_object! {
    /// A single value of an attribute or point stream.
    ///
    /// `Timestamp` is kept as the server's string so PI time expressions
    /// such as `*` can be sent back unchanged. `Value` is any JSON: numbers,
    /// strings, or an object for digital states.
    pub struct PITimedValue {
        timestamp: String => "Timestamp",
        value: Value => "Value",
        units_abbreviation: String => "UnitsAbbreviation",
        good: bool => "Good",
        questionable: bool => "Questionable",
        substituted: bool => "Substituted",
        annotated: bool => "Annotated",
    }
}
