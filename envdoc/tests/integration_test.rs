//! Integration tests

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use envdoc::{Cfg, Configurer, Describer, Description, ErrorPolicy, Opt};
use serde_json::{json, Value};
use serial_test::serial;
use std::env;
use std::time::Duration;

/// Run `$read` against a `Cfg` over `$env` and against a `Describer`, then
/// check the value, the combined error and the single description.
macro_rules! check {
    (
        env: [$(($k:expr, $v:expr)),* $(,)?],
        read: |$c:ident| $read:expr,
        value: $value:expr,
        err: $err:expr,
        description: $description:expr $(,)?
    ) => {{
        let vars: Vec<(&str, &str)> = vec![$(($k, $v)),*];

        let mut cfg = Cfg::from_map(vars);
        let value = {
            let $c = &mut cfg;
            $read
        };
        assert_eq!(value, $value);
        let err: Option<&str> = $err;
        assert_eq!(cfg.err().map(|e| e.to_string()).as_deref(), err);

        let mut describer = Describer::new();
        {
            let $c = &mut describer;
            let _ = $read;
        }
        let descriptions = describer.finish().unwrap();
        assert_eq!(descriptions.len(), 1);
        let expected: Value = $description;
        assert_eq!(serde_json::to_value(&descriptions[0]).unwrap(), expected);
        assert_eq!(cfg.descriptions(), descriptions.as_slice());
    }};
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap()
        .fixed_offset()
}

#[test]
fn test_int() {
    check! {
        env: [("a", "1")],
        read: |c| c.int("a", &[]),
        value: 1,
        err: None,
        description: json!({"name": "a", "type": "int64", "optional": false}),
    }
}

#[test]
fn test_int_missing() {
    check! {
        env: [],
        read: |c| c.int("a", &[]),
        value: 0,
        err: Some("a: variable is required"),
        description: json!({"name": "a", "type": "int64", "optional": false}),
    }
}

#[test]
fn test_int_default_string() {
    check! {
        env: [],
        read: |c| c.int("a default=2", &[]),
        value: 2,
        err: None,
        description: json!({"name": "a", "type": "int64", "optional": false, "default": 2}),
    }
}

#[test]
fn test_int_default_opt() {
    check! {
        env: [],
        read: |c| c.int("a", &[Opt::default(2)]),
        value: 2,
        err: None,
        description: json!({"name": "a", "type": "int64", "optional": false, "default": 2}),
    }
}

#[test]
fn test_int_default_in_other_base() {
    check! {
        env: [],
        read: |c| c.int("a base=2 default=010101", &[]),
        value: 21,
        err: None,
        description: json!({
            "name": "a",
            "type": "int64",
            "optional": false,
            "default": 21,
            "params": {"base": 2}
        }),
    }
}

#[test]
fn test_int_default_with_bit_size() {
    check! {
        env: [],
        read: |c| c.int("a base=2 default=010101 bit_size=32", &[]),
        value: 21,
        err: None,
        description: json!({
            "name": "a",
            "type": "int64",
            "optional": false,
            "default": 21,
            "params": {"base": 2, "bit_size": 32}
        }),
    }
}

#[test]
fn test_int_prefix_inferred() {
    check! {
        env: [],
        read: |c| c.int("a default=0xa", &[]),
        value: 10,
        err: None,
        description: json!({"name": "a", "type": "int64", "optional": false, "default": 10}),
    }
}

#[test]
fn test_int_out_of_range() {
    check! {
        env: [("a", "128")],
        read: |c| c.int("a bit_size=8", &[]),
        value: 0,
        err: Some(r#"a: "128" is out of range for 8-bit integers"#),
        description: json!({
            "name": "a",
            "type": "int64",
            "optional": false,
            "params": {"bit_size": 8}
        }),
    }
}

#[test]
fn test_bool_missing() {
    check! {
        env: [],
        read: |c| c.bool("a", &[]),
        value: false,
        err: Some("a: variable is required"),
        description: json!({"name": "a", "type": "bool", "optional": false}),
    }
}

#[test]
fn test_bool_defaults() {
    check! {
        env: [],
        read: |c| c.bool("a default=true", &[]),
        value: true,
        err: None,
        description: json!({"name": "a", "type": "bool", "optional": false, "default": true}),
    }
    check! {
        env: [],
        read: |c| c.bool("a default=false", &[]),
        value: false,
        err: None,
        description: json!({"name": "a", "type": "bool", "optional": false, "default": false}),
    }
}

#[test]
fn test_float_missing() {
    check! {
        env: [],
        read: |c| c.float("a", &[]),
        value: 0.0,
        err: Some("a: variable is required"),
        description: json!({"name": "a", "type": "float64", "optional": false}),
    }
}

#[test]
fn test_float_bit_size() {
    check! {
        env: [("a", ".1234")],
        read: |c| c.float("a bit_size=32", &[]),
        value: f64::from(0.1234_f32),
        err: None,
        description: json!({
            "name": "a",
            "type": "float64",
            "optional": false,
            "params": {"bit_size": 32}
        }),
    }
}

#[test]
fn test_float_default() {
    check! {
        env: [],
        read: |c| c.float("a bit_size=32 default=19", &[]),
        value: 19.0,
        err: None,
        description: json!({
            "name": "a",
            "type": "float64",
            "optional": false,
            "default": 19.0,
            "params": {"bit_size": 32}
        }),
    }
}

#[test]
fn test_duration() {
    check! {
        env: [("a", "30m")],
        read: |c| c.duration("a", &[]),
        value: Duration::from_secs(30 * 60),
        err: None,
        description: json!({"name": "a", "type": "time.Duration", "optional": false}),
    }
}

#[test]
fn test_duration_default() {
    check! {
        env: [],
        read: |c| c.duration("a default=15ms", &[]),
        value: Duration::from_millis(15),
        err: None,
        description: json!({
            "name": "a",
            "type": "time.Duration",
            "optional": false,
            "default": "15ms"
        }),
    }
}

#[test]
fn test_time() {
    check! {
        env: [("a", "2019-01-01T02:03:04Z")],
        read: |c| c.time("a", &[]),
        value: utc(2019, 1, 1, 2, 3, 4),
        err: None,
        description: json!({"name": "a", "type": "time.Time", "optional": false}),
    }
}

#[test]
fn test_time_custom_layout() {
    check! {
        env: [("a", "2019-01-01T02:03+00:00")],
        read: |c| c.time("a layout=%Y-%m-%dT%H:%M%:z", &[]),
        value: utc(2019, 1, 1, 2, 3, 0),
        err: None,
        description: json!({
            "name": "a",
            "type": "time.Time",
            "optional": false,
            "params": {"layout": "%Y-%m-%dT%H:%M%:z"}
        }),
    }
}

#[test]
fn test_int_slice() {
    check! {
        env: [("a", "1,2,3,4")],
        read: |c| c.int_slice("a", &[]),
        value: vec![1, 2, 3, 4],
        err: None,
        description: json!({"name": "a", "type": "[]int64", "optional": false}),
    }
}

#[test]
fn test_int_slice_custom_comma_and_base() {
    check! {
        env: [("a", "1 2 3 a")],
        read: |c| c.int_slice(r#"a comma=" " base=16"#, &[]),
        value: vec![1, 2, 3, 10],
        err: None,
        description: json!({
            "name": "a",
            "type": "[]int64",
            "optional": false,
            "params": {"comma": " ", "base": 16}
        }),
    }
}

#[test]
fn test_int_slice_empty() {
    check! {
        env: [("a", "")],
        read: |c| c.int_slice(r#"a comma=" " base=16"#, &[]),
        value: Vec::<i64>::new(),
        err: None,
        description: json!({
            "name": "a",
            "type": "[]int64",
            "optional": false,
            "params": {"comma": " ", "base": 16}
        }),
    }
}

#[test]
fn test_int_slice_element_error() {
    check! {
        env: [("a", "1,x")],
        read: |c| c.int_slice("a", &[]),
        value: Vec::<i64>::new(),
        err: Some(r#"a: index 1: invalid integer "x": invalid digit found in string"#),
        description: json!({"name": "a", "type": "[]int64", "optional": false}),
    }
}

#[test]
fn test_string_slice_quoted() {
    check! {
        env: [("a", r#""x,y",z"#)],
        read: |c| c.string_slice("a optional | tags", &[]),
        value: vec!["x,y".to_string(), "z".to_string()],
        err: None,
        description: json!({
            "name": "a",
            "type": "[]string",
            "optional": true,
            "comment": "tags"
        }),
    }
}

#[test]
fn test_uint() {
    check! {
        env: [("a", "1")],
        read: |c| c.uint("a", &[]),
        value: 1,
        err: None,
        description: json!({"name": "a", "type": "uint64", "optional": false}),
    }
    check! {
        env: [],
        read: |c| c.uint("a", &[]),
        value: 0,
        err: Some("a: variable is required"),
        description: json!({"name": "a", "type": "uint64", "optional": false}),
    }
}

#[test]
fn test_uint_defaults() {
    check! {
        env: [],
        read: |c| c.uint("a default=2", &[]),
        value: 2,
        err: None,
        description: json!({"name": "a", "type": "uint64", "optional": false, "default": 2}),
    }
    check! {
        env: [],
        read: |c| c.uint("a", &[Opt::default(2)]),
        value: 2,
        err: None,
        description: json!({"name": "a", "type": "uint64", "optional": false, "default": 2}),
    }
}

#[test]
fn test_optional_without_default() {
    check! {
        env: [],
        read: |c| c.string("a optional --- not needed", &[]),
        value: String::new(),
        err: None,
        description: json!({
            "name": "a",
            "type": "string",
            "optional": true,
            "comment": "not needed"
        }),
    }
}

#[test]
fn test_parse_failure_names_variable() {
    check! {
        env: [("a", "yes")],
        read: |c| c.bool("a", &[]),
        value: false,
        err: Some(r#"a: invalid boolean "yes""#),
        description: json!({"name": "a", "type": "bool", "optional": false}),
    }
}

#[test]
fn test_string_default_with_leading_space() {
    check! {
        env: [],
        read: |c| c.string(r#"a default=" padded" | kept as is"#, &[]),
        value: " padded".to_string(),
        err: None,
        description: json!({
            "name": "a",
            "type": "string",
            "optional": false,
            "default": " padded",
            "comment": "kept as is"
        }),
    }
}

#[test]
fn test_int_rejects_second_sign() {
    check! {
        env: [("a", "-+5")],
        read: |c| c.int("a", &[]),
        value: 0,
        err: Some(r#"a: invalid integer "-+5": misplaced sign"#),
        description: json!({"name": "a", "type": "int64", "optional": false}),
    }
}

#[test]
fn test_string_slice_text_after_quote() {
    check! {
        env: [("a", r#""a"b,c"#)],
        read: |c| c.string_slice("a", &[]),
        value: Vec::<String>::new(),
        err: Some("a: unexpected text after closing quote"),
        description: json!({"name": "a", "type": "[]string", "optional": false}),
    }
}

#[test]
fn test_bytes_url_safe_no_padding() {
    check! {
        env: [("a", "-_8")],
        read: |c| c.bytes("a url_safe no_padding", &[]),
        value: vec![0xfb, 0xff],
        err: None,
        description: json!({
            "name": "a",
            "type": "[]byte",
            "optional": false,
            "params": {"no_padding": true, "url_safe": true}
        }),
    }
}

#[test]
fn test_ip_default() {
    check! {
        env: [],
        read: |c| c.ip("a default=127.0.0.1", &[]),
        value: Some("127.0.0.1".parse::<std::net::IpAddr>().unwrap()),
        err: None,
        description: json!({
            "name": "a",
            "type": "net.IP",
            "optional": false,
            "default": "127.0.0.1"
        }),
    }
}

#[test]
fn test_var_distinguishes_absent_optional() {
    let mut cfg = Cfg::from_map([("SET", "0")]);
    let set: Option<i64> = cfg.var::<envdoc::parser::IntParser>("SET optional", &[]);
    let unset: Option<i64> = cfg.var::<envdoc::parser::IntParser>("UNSET optional", &[]);
    assert_eq!(set, Some(0));
    assert_eq!(unset, None);
    assert!(cfg.err().is_none());
}

#[test]
fn test_construction_errors_in_both_engines() {
    fn read<C: Configurer>(c: &mut C) {
        c.int("a colour=red", &[]);
        c.bool("b base=16", &[]);
        c.string_slice("c comma=ab", &[]);
        c.int("d default=zz", &[]);
        c.string("", &[]);
        c.string(r#"e default="open"#, &[]);
    }

    let expected = [
        "a: unknown option `colour`",
        "b: base is not supported",
        "c: comma must be only one character",
        r#"d: invalid default "zz": invalid integer "zz": invalid digit found in string"#,
        "declaration must contain a name",
        "e: unterminated quoted value for `default`",
    ]
    .join("\n");

    let mut cfg = Cfg::from_map([("a", "1"), ("b", "true")]);
    read(&mut cfg);
    assert!(cfg.descriptions().is_empty());
    assert_eq!(cfg.finish().unwrap_err().to_string(), expected);

    let mut describer = Describer::new();
    read(&mut describer);
    assert!(describer.descriptions().is_empty());
    let err = describer.finish().unwrap_err();
    assert!(err.iter().all(|e| e.is_construction()));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_programmatic_options_override_declaration() {
    let mut cfg = Cfg::from_map([("a", "10")]);
    let value = cfg.int("a base=2 | binary", &[Opt::base(16), Opt::comment("hex")]);
    assert_eq!(value, 16);

    let description = &cfg.descriptions()[0];
    assert_eq!(description.params["base"], 16);
    assert_eq!(description.comment, "hex");
}

#[test]
fn test_string_default_parsed_after_options() {
    let mut describer = Describer::new();
    describer.int("a default=ff", &[Opt::base(16)]);
    assert_eq!(describer.descriptions()[0].default, Some(json!(255)));
}

#[test]
fn test_typed_default_replaces_string_default() {
    let mut cfg = Cfg::from_map::<_, &str, &str>([]);
    let value = cfg.duration("a default=1h", &[Opt::default(Duration::from_secs(5))]);
    assert_eq!(value, Duration::from_secs(5));
    assert_eq!(cfg.descriptions()[0].default, Some(json!("5s")));
}

#[test]
fn test_descriptions_keep_call_order() {
    let mut cfg = Cfg::from_map([("B", "x")]);
    cfg.int("A default=1", &[]);
    cfg.string("B", &[]);
    cfg.has("C");
    cfg.uint_slice("D optional", &[]);

    let names: Vec<&str> = cfg
        .descriptions()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["A", "B", "C", "D"]);
}

#[test]
fn test_comment_with_own_name() {
    let mut describer = Describer::new();
    describer.string("PORT optional PORT to listen on", &[]);
    let description = &describer.descriptions()[0];
    assert!(description.optional);
    assert_eq!(description.comment, "PORT to listen on");
}

#[test]
fn test_description_declaration_round_trip() {
    let mut describer = Describer::new();
    describer.int("a base=16 bit_size=32 default=-7f | signed hex", &[]);
    describer.string(r#"b default="two words" optional"#, &[]);
    describer.float_slice("c comma=; default=1.5;2", &[]);

    let descriptions = describer.finish().unwrap();
    let mut rebuilt = Describer::new();
    rebuilt.int(&descriptions[0].to_declaration(), &[]);
    rebuilt.string(&descriptions[1].to_declaration(), &[]);
    rebuilt.float_slice(&descriptions[2].to_declaration(), &[]);
    assert_eq!(rebuilt.finish().unwrap(), descriptions);
}

#[test]
fn test_description_json_round_trip() {
    let mut describer = Describer::new();
    describer.time(
        r#"a layout="%Y-%m-%d %H:%M" default="2019-01-01 02:03" | start"#,
        &[],
    );
    let descriptions = describer.finish().unwrap();

    let text = serde_json::to_string(&descriptions).unwrap();
    let parsed: Vec<Description> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, descriptions);
    assert_eq!(parsed[0].default, Some(json!("2019-01-01 02:03")));
}

#[test]
#[should_panic(expected = "a: variable is required")]
fn test_panic_policy_panics_on_first_error() {
    let mut cfg = Cfg::builder()
        .lookup(|_| None)
        .policy(ErrorPolicy::Panic)
        .build();
    cfg.int("a", &[]);
}

#[test]
fn test_custom_lookup() {
    let mut cfg = Cfg::builder()
        .lookup(|name| name.strip_prefix("ECHO_").map(str::to_lowercase))
        .build();
    assert_eq!(cfg.string("ECHO_HELLO", &[]), "hello");
    assert!(cfg.err().is_none());
}

#[test]
#[serial]
fn test_reads_process_environment() {
    env::set_var("ENVDOC_TEST_PORT", "8080");
    env::remove_var("ENVDOC_TEST_HOST");

    let mut cfg = Cfg::new();
    let port = cfg.uint("ENVDOC_TEST_PORT bit_size=16", &[]);
    let host = cfg.string("ENVDOC_TEST_HOST default=localhost", &[]);
    let verbose = cfg.has("ENVDOC_TEST_PORT");

    assert_eq!(port, 8080);
    assert_eq!(host, "localhost");
    assert!(verbose);
    assert!(cfg.finish().is_ok());

    env::remove_var("ENVDOC_TEST_PORT");
}
