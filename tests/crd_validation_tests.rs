//! # CRD Validation Tests
//!
//! Tests for the `Redis` CRD to catch schema drift early. These validate that
//! sample resources deserialize and that the generated CRD carries the expected
//! names, scope, subresources and required fields.

use kube::core::CustomResourceExt;
use redis_operator::crd::{Redis, RedisStatus};

const SAMPLE: &str = r#"
apiVersion: cache.tc/v1alpha1
kind: Redis
metadata:
  name: sessions
  namespace: default
spec:
  image: redis
  version: "6.2"
  replicas: 3
  secretName: sessions-secret
  storage:
    size: 1Gi
    storageClassName: fast
  resources:
    requests:
      cpu: 500m
      memory: 512Mi
    limits:
      cpu: "1"
      memory: 1Gi
"#;

fn crd_json() -> serde_json::Value {
    serde_json::to_value(Redis::crd()).expect("CRD should serialize")
}

fn spec_schema() -> serde_json::Value {
    crd_json()["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]["spec"].clone()
}

#[test]
fn test_sample_resource_deserializes() {
    let redis: Redis = serde_yaml::from_str(SAMPLE).expect("Should deserialize sample Redis");

    assert_eq!(redis.metadata.name.as_deref(), Some("sessions"));
    assert_eq!(redis.spec.image, "redis");
    assert_eq!(redis.spec.version, "6.2");
    assert_eq!(redis.spec.replicas, 3);
    assert_eq!(redis.spec.secret_name.as_deref(), Some("sessions-secret"));
    assert_eq!(redis.spec.storage.size, "1Gi");
    assert_eq!(redis.spec.storage.storage_class_name.as_deref(), Some("fast"));
    assert_eq!(redis.spec.resources.requests.cpu, "500m");
    assert_eq!(redis.spec.resources.limits.cpu, "1");
    assert!(redis.status.is_none());
}

#[test]
fn test_optional_fields_may_be_omitted() {
    let yaml = SAMPLE
        .replace("  secretName: sessions-secret\n", "")
        .replace("    storageClassName: fast\n", "");
    let redis: Redis = serde_yaml::from_str(&yaml).expect("Optional fields should be optional");

    assert_eq!(redis.spec.secret_name, None);
    assert_eq!(redis.spec.storage.storage_class_name, None);
}

#[test]
fn test_limits_are_required() {
    let yaml = SAMPLE.replace(
        "    limits:\n      cpu: \"1\"\n      memory: 1Gi\n",
        "",
    );
    assert!(serde_yaml::from_str::<Redis>(&yaml).is_err());
}

#[test]
fn test_status_round_trips_camel_case() {
    let status: RedisStatus = serde_json::from_value(serde_json::json!({
        "readyReplicas": 2,
        "totalReplicas": 3,
        "conditions": [{
            "type": "Available",
            "status": "True",
            "lastTransitionTime": "2024-05-01T10:00:00Z"
        }]
    }))
    .unwrap();
    assert_eq!(status.ready_replicas, 2);
    assert_eq!(status.conditions[0].reason, None);

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["totalReplicas"], 3);
    assert_eq!(value["conditions"][0]["lastTransitionTime"], "2024-05-01T10:00:00Z");
}

#[test]
fn test_empty_status_uses_defaults() {
    let status: RedisStatus = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(status, RedisStatus::default());
}

#[test]
fn test_crd_names_and_scope() {
    let crd = crd_json();

    assert_eq!(Redis::crd_name(), "redis.cache.tc");
    assert_eq!(crd["spec"]["group"], "cache.tc");
    assert_eq!(crd["spec"]["scope"], "Namespaced");
    assert_eq!(crd["spec"]["names"]["kind"], "Redis");
    assert_eq!(crd["spec"]["names"]["plural"], "redis");
    assert_eq!(crd["spec"]["names"]["shortNames"][0], "rd");

    let version = &crd["spec"]["versions"][0];
    assert_eq!(version["name"], "v1alpha1");
    assert!(version["subresources"]["status"].is_object());
}

#[test]
fn test_crd_schema_required_fields() {
    let schema = spec_schema();
    let required: Vec<&str> = schema["required"]
        .as_array()
        .expect("spec schema should list required fields")
        .iter()
        .filter_map(serde_json::Value::as_str)
        .collect();

    for field in ["image", "version", "storage", "replicas", "resources"] {
        assert!(required.contains(&field), "{field} should be required");
    }
    assert!(!required.contains(&"secretName"));

    let properties = &schema["properties"];
    assert_eq!(properties["replicas"]["minimum"].as_f64(), Some(0.0));
    assert!(properties["resources"]["properties"]["limits"].is_object());
}
