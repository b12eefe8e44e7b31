use serde::Serialize;
use serde_blocks::{
    encode_as_block, encode_into_body, encode_into_body_with_options, to_body, to_value, value,
    Body, EncodeOptions, Error, Number, Value, ValueMap,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize)]
struct Listener {
    #[serde(rename = "port")]
    port: u16,
}

#[derive(Serialize)]
struct Server {
    #[serde(rename = "kind,label")]
    kind: String,
    #[serde(rename = "name,label")]
    name: String,
    #[serde(rename = "host")]
    host: String,
    #[serde(rename = "tags")]
    tags: Vec<String>,
    #[serde(rename = "limits")]
    limits: BTreeMap<String, u32>,
    #[serde(rename = "listener,block")]
    listeners: Vec<Listener>,
    #[serde(rename = "tls,block")]
    tls: Option<Listener>,
}

fn server() -> Server {
    let mut limits = BTreeMap::new();
    limits.insert("memory".to_string(), 512);
    limits.insert("cpu".to_string(), 2);
    Server {
        kind: "http".to_string(),
        name: "edge".to_string(),
        host: "0.0.0.0".to_string(),
        tags: vec!["public".to_string()],
        limits,
        listeners: vec![Listener { port: 80 }, Listener { port: 8080 }],
        tls: None,
    }
}

#[test]
fn test_attributes_precede_blocks_in_field_order() {
    let body = to_body(&server()).unwrap();

    let names: Vec<_> = body.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(names, ["host", "tags", "limits"]);
    assert_eq!(body.get_attribute("tags"), Some(&value!(["public"])));
    assert_eq!(
        body.get_attribute("limits"),
        Some(&value!({"cpu": 2, "memory": 512}))
    );

    let ports: Vec<_> = body
        .blocks_of_type("listener")
        .map(|b| b.body().get_attribute("port").and_then(Value::as_i64))
        .collect();
    assert_eq!(ports, [Some(80), Some(8080)]);
}

#[test]
fn test_absent_block_emits_nothing() {
    let body = to_body(&server()).unwrap();
    assert_eq!(body.blocks_of_type("tls").count(), 0);
}

#[test]
fn test_root_labels_are_ignored_but_encode_as_block_uses_them() {
    let body = to_body(&server()).unwrap();
    assert!(body.get_attribute("kind").is_none());
    assert!(body.get_attribute("name").is_none());

    let block = encode_as_block(&server(), "server").unwrap();
    assert_eq!(block.ident(), "server");
    assert_eq!(block.labels(), ["http", "edge"]);
    assert_eq!(block.body().attributes().len(), 3);
}

#[test]
fn test_nested_block_labels_from_multiple_fields() {
    #[derive(Serialize)]
    struct Root {
        #[serde(rename = "server,block")]
        servers: Vec<Server>,
    }

    let body = to_body(&Root {
        servers: vec![server()],
    })
    .unwrap();
    assert_eq!(body.blocks()[0].labels(), ["http", "edge"]);
}

#[derive(Serialize)]
struct Module {
    #[serde(rename = "source")]
    source: String,
    #[serde(rename = ",remain")]
    extra: HashMap<String, Value>,
}

#[test]
fn test_remainder_map_adds_sorted_attributes() {
    let mut extra = HashMap::new();
    extra.insert("zone".to_string(), Value::from("eu-1"));
    extra.insert("count".to_string(), Value::from(3));
    extra.insert("enabled".to_string(), Value::Bool(true));

    let body = to_body(&Module {
        source: "./vpc".to_string(),
        extra,
    })
    .unwrap();

    let names: Vec<_> = body.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(names, ["source", "count", "enabled", "zone"]);
}

#[test]
fn test_remainder_name_collision() {
    let mut extra = HashMap::new();
    extra.insert("source".to_string(), Value::from("other"));

    let mut body = Body::new();
    let err = encode_into_body(
        &Module {
            source: "./vpc".to_string(),
            extra,
        },
        &mut body,
    )
    .unwrap_err();

    assert_eq!(
        err,
        Error::NameCollision {
            path: "Module.<remain>".to_string(),
            name: "source".to_string(),
        }
    );
    // The named attribute written before the failure stays.
    assert_eq!(body.get_attribute("source"), Some(&Value::from("./vpc")));
}

#[derive(Serialize)]
struct Resource {
    #[serde(rename = "type,label")]
    kind: String,
    #[serde(rename = "ami")]
    ami: String,
    #[serde(rename = "lifecycle,block")]
    lifecycle: Option<Lifecycle>,
    #[serde(rename = ",remain,body")]
    rest: Body,
}

#[derive(Serialize)]
struct Lifecycle {
    #[serde(rename = "prevent_destroy")]
    prevent_destroy: bool,
}

#[test]
fn test_remainder_body_is_merged() {
    let mut rest = Body::new();
    rest.set_attribute("count", 2);
    rest.append_block("provisioner", ["local-exec"])
        .set_attribute("command", "echo hi");

    let resource = Resource {
        kind: "aws_instance".to_string(),
        ami: "ami-123".to_string(),
        lifecycle: Some(Lifecycle {
            prevent_destroy: true,
        }),
        rest,
    };

    let block = encode_as_block(&resource, "resource").unwrap();
    assert_eq!(block.labels(), ["aws_instance"]);

    let body = block.body();
    let names: Vec<_> = body.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(names, ["ami", "count"]);

    let idents: Vec<_> = body.blocks().iter().map(|b| b.ident()).collect();
    assert_eq!(idents, ["lifecycle", "provisioner"]);
    assert_eq!(body.blocks()[1].labels(), ["local-exec"]);
    assert_eq!(
        body.blocks()[1].body().get_attribute("command"),
        Some(&Value::from("echo hi"))
    );
}

#[test]
fn test_remainder_body_collision() {
    let mut rest = Body::new();
    rest.set_attribute("ami", "ami-999");

    let err = to_body(&Resource {
        kind: "aws_instance".to_string(),
        ami: "ami-123".to_string(),
        lifecycle: None,
        rest,
    })
    .unwrap_err();
    assert!(matches!(err, Error::NameCollision { ref name, .. } if name == "ami"));
}

#[test]
fn test_remainder_wrong_form() {
    #[derive(Serialize)]
    struct WrongRemainder {
        #[serde(rename = ",remain,body")]
        rest: HashMap<String, String>,
    }

    let err = to_body(&WrongRemainder {
        rest: HashMap::new(),
    })
    .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_map_of_blocks_with_two_labels_fails_without_output() {
    #[derive(Serialize)]
    struct Route {
        #[serde(rename = "method,label")]
        method: String,
        #[serde(rename = "path,label")]
        path: String,
    }

    #[derive(Serialize)]
    struct Router {
        #[serde(rename = "name")]
        name: String,
        #[serde(rename = "route,block")]
        routes: HashMap<String, Route>,
    }

    let mut routes = HashMap::new();
    routes.insert(
        "index".to_string(),
        Route {
            method: "GET".to_string(),
            path: "/".to_string(),
        },
    );

    let mut body = Body::new();
    let err = encode_into_body(
        &Router {
            name: "main".to_string(),
            routes,
        },
        &mut body,
    )
    .unwrap_err();

    assert!(err.is_schema());
    assert!(body.blocks().is_empty());
    assert_eq!(body.get_attribute("name"), Some(&Value::from("main")));
}

#[test]
fn test_schema_errors() {
    #[derive(Serialize)]
    struct LabelLast {
        #[serde(rename = "size")]
        size: u8,
        #[serde(rename = "name,label")]
        name: String,
    }

    #[derive(Serialize)]
    struct UnknownModifier {
        #[serde(rename = "size,required")]
        size: u8,
    }

    #[derive(Serialize)]
    struct TwoRemainders {
        #[serde(rename = ",remain")]
        a: HashMap<String, u8>,
        #[serde(rename = "other,remain")]
        b: HashMap<String, u8>,
    }

    assert!(to_body(&LabelLast {
        size: 1,
        name: "x".into()
    })
    .unwrap_err()
    .is_schema());
    assert!(to_body(&UnknownModifier { size: 1 }).unwrap_err().is_schema());
    assert!(to_body(&TwoRemainders {
        a: HashMap::new(),
        b: HashMap::new()
    })
    .unwrap_err()
    .is_schema());
}

#[test]
fn test_type_mismatches() {
    #[derive(Serialize)]
    struct ScalarBlock {
        #[serde(rename = "child,block")]
        child: String,
    }

    #[derive(Serialize)]
    struct NumberLabel {
        #[serde(rename = "id,label")]
        id: u32,
    }

    #[derive(Serialize)]
    struct Holder {
        #[serde(rename = "item,block")]
        item: NumberLabel,
    }

    assert!(matches!(
        to_body(&ScalarBlock {
            child: "x".into()
        }),
        Err(Error::TypeMismatch { .. })
    ));

    let err = to_body(&Holder {
        item: NumberLabel { id: 3 },
    })
    .unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            path: "NumberLabel.id".to_string(),
            expected: "string label".to_string(),
            found: "number".to_string(),
        }
    );
}

#[test]
fn test_missing_required_label() {
    #[derive(Serialize)]
    struct Named {
        #[serde(rename = "name,label")]
        name: Option<String>,
    }

    #[derive(Serialize)]
    struct Holder {
        #[serde(rename = "named,block")]
        named: Named,
    }

    let err = to_body(&Holder {
        named: Named { name: None },
    })
    .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref found, .. } if found == "absent value"));
}

#[test]
fn test_untagged_struct_attribute_is_excluded() {
    #[derive(Serialize)]
    struct Inner {
        #[serde(rename = "a")]
        a: u8,
    }

    #[derive(Serialize)]
    struct Outer {
        #[serde(rename = "name")]
        name: String,
        #[serde(rename = "inner")]
        inner: Inner,
        #[serde(rename = "inners")]
        inners: Vec<Inner>,
    }

    let body = to_body(&Outer {
        name: "x".into(),
        inner: Inner { a: 1 },
        inners: vec![Inner { a: 2 }],
    })
    .unwrap();

    assert!(body.get_attribute("inner").is_none());
    assert_eq!(body.get_attribute("inners"), Some(&value!([{"a": 2}])));
    assert!(body.blocks().is_empty());
}

#[test]
fn test_unit_struct_block_is_empty() {
    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    struct Holder {
        #[serde(rename = "marker,block")]
        marker: Marker,
    }

    let body = to_body(&Holder { marker: Marker }).unwrap();
    assert_eq!(body.blocks().len(), 1);
    assert!(body.blocks()[0].body().is_empty());
}

#[test]
fn test_large_integers_are_exact() {
    #[derive(Serialize)]
    struct Counters {
        #[serde(rename = "max")]
        max: u64,
        #[serde(rename = "wide")]
        wide: i128,
    }

    let body = to_body(&Counters {
        max: u64::MAX,
        wide: i128::MIN,
    })
    .unwrap();

    match body.get_attribute("max") {
        Some(Value::Number(Number::Big(b))) => assert_eq!(b.to_string(), u64::MAX.to_string()),
        other => panic!("Expected big integer, got {:?}", other),
    }
    match body.get_attribute("wide") {
        Some(Value::Number(n)) => assert_eq!(n.to_string(), i128::MIN.to_string()),
        other => panic!("Expected number, got {:?}", other),
    }
}

#[test]
fn test_unit_enum_variants_are_strings() {
    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Strict,
    }

    #[derive(Serialize)]
    struct Policy {
        #[serde(rename = "mode")]
        mode: Mode,
    }

    let body = to_body(&Policy { mode: Mode::Strict }).unwrap();
    assert_eq!(body.get_attribute("mode"), Some(&Value::from("strict")));
}

#[test]
fn test_to_value_sorts_map_keys() {
    let mut source = HashMap::new();
    source.insert("b", 1);
    source.insert("a", 2);

    let value = to_value(&source).unwrap();
    let map: &ValueMap = value.as_map().unwrap();
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
}

#[derive(Serialize)]
struct Worker {
    #[serde(rename = "name,label")]
    name: String,
    #[serde(rename = "threads")]
    threads: u8,
}

#[derive(Serialize)]
struct Pool {
    #[serde(rename = "worker,block")]
    workers: HashMap<String, Option<Worker>>,
}

#[test]
fn test_map_of_absent_blocks_emits_nothing() {
    let mut workers = HashMap::new();
    workers.insert("a".to_string(), None);
    workers.insert("b".to_string(), None);

    let body = to_body(&Pool { workers }).unwrap();
    assert!(body.blocks().is_empty());
}

#[test]
fn test_map_of_blocks_skips_absent_entries() {
    let mut workers = HashMap::new();
    workers.insert("a".to_string(), None);
    workers.insert(
        "b".to_string(),
        Some(Worker {
            name: "b".to_string(),
            threads: 4,
        }),
    );

    let body = to_body(&Pool { workers }).unwrap();
    assert_eq!(body.blocks().len(), 1);
    assert_eq!(body.blocks()[0].labels(), ["b"]);
    assert_eq!(
        body.blocks()[0].body().get_attribute("threads"),
        Some(&Value::from(4))
    );
}

struct Chain;

impl Serialize for Chain {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Chain", 2)?;
        s.serialize_field("id", &1)?;
        s.serialize_field("next,block", &Some(Chain))?;
        s.end()
    }
}

#[test]
fn test_self_referential_value_fails_with_cycle() {
    let mut body = Body::new();
    let options = EncodeOptions::new().with_max_depth(8);
    let err = encode_into_body_with_options(&Chain, &mut body, &options).unwrap_err();

    assert_eq!(err, Error::Cycle { limit: 8 });
    assert!(body.is_empty());
    assert!(matches!(to_body(&Chain), Err(Error::Cycle { .. })));
}
