//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use std::fmt::Debug;

use piwebapi_core::{
    ApiError, ChildOf, FieldSelector, HttpMethod, HttpRequest, HttpResponse, PIAssetDatabase,
    PIAssetServer, PIAttribute, PIAttributeTemplate, PIDataServer, PIElement, PIElementTemplate,
    PIEventFrame, PIPoint, PITimedValue, PiWebApiClient, Resource, RootResource,
};
use serde_json::Value;

const BASE_URL: &str = "https://pi.example.com/piwebapi";

fn client() -> PiWebApiClient {
    PiWebApiClient::new(BASE_URL).unwrap()
}

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn selector(case: &Value) -> Option<FieldSelector> {
    case.get("selected_fields").map(|fields| {
        fields
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap().to_string())
            .collect()
    })
}

fn str_field<'a>(case: &'a Value, key: &str) -> &'a str {
    case[key].as_str().unwrap_or_else(|| panic!("missing {key}"))
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(str_field(expected, "method")), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", str_field(expected, "path")), "{name}: url");
    assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: pairs(&sim["headers"]),
        body: str_field(sim, "body").to_string(),
    }
}

fn check_error(name: &str, err: ApiError, expected: &Value) {
    match str_field(expected, "kind") {
        "NotFound" => assert!(matches!(err, ApiError::NotFound { .. }), "{name}: expected NotFound, got {err:?}"),
        "HttpError" => {
            let status = expected["status"].as_u64().unwrap() as u16;
            assert!(
                matches!(err, ApiError::HttpError { status: s, .. } if s == status),
                "{name}: expected HttpError {status}, got {err:?}"
            );
        }
        "MissingLocation" => {
            assert!(matches!(err, ApiError::MissingLocation), "{name}: got {err:?}");
            return;
        }
        other => panic!("{name}: unknown expected_error: {other}"),
    }
    let messages: Vec<String> = serde_json::from_value(expected["messages"].clone()).unwrap();
    assert_eq!(err.payload().unwrap().messages(), messages, "{name}: messages");
}

/// Checks a parse outcome against `expected_result` or `expected_error`.
fn check_outcome<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: serde::de::DeserializeOwned + PartialEq + Debug,
{
    match case.get("expected_error") {
        Some(expected) => check_error(name, result.unwrap_err(), expected),
        None => match case.get("expected_result") {
            Some(expected) => {
                let expected: T = serde_json::from_value(expected.clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: parsed result");
            }
            None => {
                result.unwrap();
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

fn get_case<R: Resource + PartialEq>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let sel = selector(case);
    let req = c.build_get::<R>(str_field(case, "web_id"), sel.as_ref()).unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome(name, case, c.parse_get::<R>(simulated(case)));
}

#[test]
fn get_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/get.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        match str_field(case, "resource") {
            "elements" => get_case::<PIElement>(&c, case),
            "elementtemplates" => get_case::<PIElementTemplate>(&c, case),
            "attributes" => get_case::<PIAttribute>(&c, case),
            "points" => get_case::<PIPoint>(&c, case),
            other => panic!("unhandled resource {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Get by path
// ---------------------------------------------------------------------------

fn get_by_path_case<R: Resource + PartialEq>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let sel = selector(case);
    let req = c.build_get_by_path::<R>(str_field(case, "pi_path"), sel.as_ref()).unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome(name, case, c.parse_get::<R>(simulated(case)));
}

#[test]
fn get_by_path_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/get_by_path.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        match str_field(case, "resource") {
            "elements" => get_by_path_case::<PIElement>(&c, case),
            "elementtemplates" => get_by_path_case::<PIElementTemplate>(&c, case),
            "attributes" => get_by_path_case::<PIAttribute>(&c, case),
            other => panic!("unhandled resource {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

fn list_case<R: RootResource + PartialEq>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let sel = selector(case);
    let req = c.build_list::<R>(sel.as_ref()).unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome(name, case, c.parse_list::<R>(simulated(case)));
}

fn children_case<P: Resource, C: ChildOf<P> + PartialEq>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let sel = selector(case);
    let req = c
        .build_list_children::<P, C>(str_field(case, "parent_web_id"), sel.as_ref())
        .unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome(name, case, c.parse_list::<C>(simulated(case)));
}

#[test]
fn list_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/list.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let parent = case.get("parent").and_then(Value::as_str);
        match (parent, str_field(case, "collection")) {
            (None, "assetservers") => list_case::<PIAssetServer>(&c, case),
            (None, "dataservers") => list_case::<PIDataServer>(&c, case),
            (Some("elements"), "attributes") => children_case::<PIElement, PIAttribute>(&c, case),
            (Some("assetdatabases"), "elements") => children_case::<PIAssetDatabase, PIElement>(&c, case),
            (Some("dataservers"), "points") => children_case::<PIDataServer, PIPoint>(&c, case),
            other => panic!("unhandled collection {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

fn create_case<P: Resource, C: ChildOf<P>>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let input: C = serde_json::from_value(case["input"].clone()).unwrap();
    let req = c
        .build_create_child::<P, C>(str_field(case, "parent_web_id"), &input)
        .unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome::<String>(name, case, c.parse_create(simulated(case)));
}

#[test]
fn create_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/create.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        match (str_field(case, "parent"), str_field(case, "collection")) {
            ("assetdatabases", "elements") => create_case::<PIAssetDatabase, PIElement>(&c, case),
            ("elements", "attributes") => create_case::<PIElement, PIAttribute>(&c, case),
            other => panic!("unhandled collection {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

fn update_case<R: Resource>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let input: R = serde_json::from_value(case["input"].clone()).unwrap();
    let req = c.build_update(str_field(case, "web_id"), &input).unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome::<()>(name, case, c.parse_update(simulated(case)));
}

#[test]
fn update_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/update.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        match str_field(case, "resource") {
            "elements" => update_case::<PIElement>(&c, case),
            "attributetemplates" => update_case::<PIAttributeTemplate>(&c, case),
            other => panic!("unhandled resource {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

fn delete_case<R: Resource>(c: &PiWebApiClient, case: &Value) {
    let name = str_field(case, "name");
    let req = c.build_delete::<R>(str_field(case, "web_id")).unwrap();
    check_request(name, &req, &case["expected_request"]);
    check_outcome::<()>(name, case, c.parse_delete(simulated(case)));
}

#[test]
fn delete_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/delete.json"));
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        match str_field(case, "resource") {
            "elements" => delete_case::<PIElement>(&c, case),
            "eventframes" => delete_case::<PIEventFrame>(&c, case),
            other => panic!("unhandled resource {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stream values
// ---------------------------------------------------------------------------

#[test]
fn value_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/value.json"));
    let c = client();

    for case in vectors["get_cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let sel = selector(case);
        let req = c.build_get_value(str_field(case, "web_id"), sel.as_ref()).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_outcome::<PITimedValue>(name, case, c.parse_get_value(simulated(case)));
    }

    for case in vectors["update_cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let input: PITimedValue = serde_json::from_value(case["input"].clone()).unwrap();
        let req = c.build_update_value(str_field(case, "web_id"), &input).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_outcome::<()>(name, case, c.parse_update_value(simulated(case)));
    }
}
