use joinery_resolve::api::{resolve_json, validate_json};
use serde_json::{json, Value};

fn resolve_value(request: &Value) -> Value {
    serde_json::from_str(&resolve_json(&request.to_string())).unwrap()
}

fn validate_value(request: &Value) -> Value {
    serde_json::from_str(&validate_json(&request.to_string())).unwrap()
}

fn wardrobe(height: f64) -> Value {
    json!({
        "productDims": {"length": 1000, "width": 600, "height": height, "quantity": 1},
        "parameters": [{"abbreviation": "SH", "value": 18, "name": "Side thickness"}],
        "partTemplates": [
            {
                "name": "Side",
                "shapeType": "rectangle",
                "lengthEq": "H",
                "widthEq": "D",
                "qtyEq": "2",
                "equationScope": "PART",
                "materialWhitelist": [
                    {"materialId": "ply-12", "thicknessMm": 12},
                    {"materialId": "ply-18", "thicknessMm": 18},
                    {"materialId": "ply-25", "thicknessMm": 25}
                ],
                "materialExpression": "T <= SH",
                "hardwareRules": [{"hardwareId": "cam", "quantityEquation": "round(H / 400, 1)"}]
            },
            {
                "name": "Shelf",
                "lengthEq": "product_length - 2 * side_thickness",
                "widthEq": "product_width / 0",
                "qtyEq": ""
            },
            {
                "name": "Top",
                "lengthEq": "product_length / 2",
                "widthEq": "side_width"
            }
        ],
        "hardwareRules": [
            {"hardwareId": "leg", "quantityEquation": "4", "applicabilityCondition": "product_height > 600"}
        ],
        "validationExpression": "product_height <= 900"
    })
}

#[test]
fn dry_run_preview() {
    let response = resolve_value(&wardrobe(800.0));

    let preview = response["preview"].as_array().unwrap();
    assert_eq!(preview.len(), 2);
    assert_eq!(preview[0]["name"], "Side");
    assert_eq!(preview[0]["materialId"], "ply-18");
    assert_eq!(preview[0]["thickness"], 18.0);
    assert_eq!(preview[0]["quantity"], 2);
    assert_eq!(preview[0]["shapeType"], "rectangle");
    assert_eq!(preview[1]["name"], "Top");
    assert_eq!(preview[1]["length"], 500.0);
    assert_eq!(preview[1]["width"], 600.0);
    assert!(preview[1].get("thickness").is_none());

    assert_eq!(
        response["hardware"],
        json!([
            {"hardwareId": "cam", "quantity": 4.0},
            {"hardwareId": "leg", "quantity": 4.0}
        ])
    );
}

#[test]
fn dry_run_reports_part_errors() {
    let response = resolve_value(&wardrobe(800.0));
    assert_eq!(
        response["errors"],
        json!([{"part": "Shelf", "message": "widthEq: division by zero"}])
    );
    assert_eq!(response["warnings"], json!([]));
}

#[test]
fn rejected_configuration_has_no_preview() {
    let response = resolve_value(&wardrobe(950.0));
    assert!(response.get("preview").is_none());
    let error = response["error"].as_str().unwrap();
    assert!(error.starts_with("validation expression failed"));
}

#[test]
fn invalid_definition_is_fatal() {
    let mut request = wardrobe(800.0);
    request["parameters"] = json!([{"abbreviation": "max", "value": 1}]);
    let response = resolve_value(&request);
    assert_eq!(
        response["error"],
        "invalid definition: parameter abbreviation 'max' is reserved"
    );
}

#[test]
fn resolve_output_is_deterministic() {
    let request = wardrobe(720.0).to_string();
    assert_eq!(resolve_json(&request), resolve_json(&request));
}

#[test]
fn malformed_resolve_request() {
    let response: Value = serde_json::from_str(&resolve_json("[1, 2")).unwrap();
    assert!(response["error"].as_str().unwrap().starts_with("malformed request"));
}

#[test]
fn validate_checks_identifiers_and_delimiters() {
    let base = json!({
        "scope": "GLOBAL",
        "productDims": {"length": 1000, "width": 600, "height": 800},
        "parameters": [{"abbreviation": "GAP", "value": 2}],
        "parts": ["Side Panel"]
    });

    let mut ok = base.clone();
    ok["expression"] = json!("side_panel_length - gap");
    assert_eq!(validate_value(&ok), json!({"valid": true}));

    let mut unknown = base.clone();
    unknown["expression"] = json!("side_panel_depth + Gap");
    assert_eq!(
        validate_value(&unknown)["error"],
        "unknown identifier(s): side_panel_depth"
    );

    let mut unbalanced = base;
    unbalanced["expression"] = json!("max(gap, 3");
    let response = validate_value(&unbalanced);
    assert_eq!(response["valid"], false);
    assert!(response["error"]
        .as_str()
        .unwrap()
        .starts_with("unbalanced delimiters"));
}

#[test]
fn validate_evaluates_with_sample_values() {
    let request = json!({
        "expression": "L / (T - 18)",
        "scope": "PART"
    });
    assert_eq!(
        validate_value(&request),
        json!({"valid": false, "error": "division by zero"})
    );

    let request = json!({"expression": "", "scope": "PART"});
    assert_eq!(validate_value(&request), json!({"valid": true}));
}

#[test]
fn validate_sample_values_keep_builtins() {
    let request = json!({
        "expression": "1 / (product_length - 100)",
        "scope": "GLOBAL",
        "productDims": {"length": 1000, "width": 600, "height": 800},
        "parts": ["Product"]
    });
    assert_eq!(validate_value(&request), json!({"valid": true}));
}
