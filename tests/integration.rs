//! End-to-end scenarios spanning schema loading, the value tree, the
//! binary codec and the JSON bridge together.

use std::sync::Arc;

use slotrec::schema::{FieldType, Schema};
use slotrec::value::Record;

fn push_model(out: &mut Vec<u8>, name: &str, fields: &[(&str, FieldType, u8)]) {
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    out.push(fields.len() as u8);
    for (alias, field_type, sub_type) in fields {
        out.push(alias.len() as u8);
        out.extend_from_slice(alias.as_bytes());
        out.push(field_type.code());
        out.push(*sub_type);
    }
}

fn user_schema() -> Arc<Schema> {
    let mut bytes = vec![3u8];
    push_model(
        &mut bytes,
        "user",
        &[
            ("age", FieldType::Byte, 0),
            ("gender", FieldType::Byte, 0),
            ("job", FieldType::Model, 1),
            ("tasks", FieldType::ModelArray, 2),
            ("name", FieldType::Array, FieldType::Char.code()),
        ],
    );
    push_model(
        &mut bytes,
        "job",
        &[
            ("title", FieldType::Array, FieldType::Char.code()),
            ("type", FieldType::Byte, 0),
        ],
    );
    push_model(
        &mut bytes,
        "task",
        &[
            ("id", FieldType::Int2, 0),
            ("status", FieldType::Byte, 0),
            ("time", FieldType::Array, FieldType::Int4.code()),
        ],
    );
    Arc::new(Schema::load(&bytes).unwrap())
}

fn build_user(schema: &Arc<Schema>) -> Record {
    let mut user = Record::new(Arc::clone(schema), "user").unwrap();
    user.set_byte("age", 30);
    user.set_byte("gender", 1);

    let mut job = user.new_child("job").unwrap();
    job.set_byte("type", 2);
    let title = job.new_array_chars("title", b"Product Manager").unwrap();
    job.set_array("title", title);
    user.set_record("job", job);

    let mut task1 = user.new_child("tasks").unwrap();
    task1.set_int2("id", 10001);
    task1.set_byte("status", 3);

    let mut task2 = user.new_child("tasks").unwrap();
    task2.set_int2("id", -10002);
    task2.set_byte("status", 2);
    let time = task2.new_array_int4s("time", &[1234567, -7654321]).unwrap();
    task2.set_array("time", time);

    let mut tasks = user.new_array_records("tasks", 2).unwrap();
    tasks.set_record(0, task1);
    tasks.set_record(1, task2);
    user.set_array("tasks", tasks);

    let name = user.new_array_chars("name", b"Zhang Ji").unwrap();
    user.set_array("name", name);

    user
}

#[test]
fn scenario_schema_then_value_then_binary_round_trip() {
    let schema = user_schema();
    let user = build_user(&schema);
    let encoded = user.encode();

    let mut decoded = Record::new(Arc::clone(&schema), "user").unwrap();
    decoded.decode(&encoded);

    assert_eq!(decoded.get_byte("age"), 30);
    assert_eq!(decoded.get_record("job").unwrap().get_byte("type"), 2);
    assert_eq!(decoded.get_array("tasks").unwrap().count(), 2);
    assert_eq!(
        decoded.get_array("tasks").unwrap().get_record(1).unwrap().get_int2("id"),
        -10002
    );
}

#[test]
fn scenario_binary_then_json_produce_equivalent_trees() {
    let schema = user_schema();
    let user = build_user(&schema);

    let encoded = user.encode();
    let mut via_binary = Record::new(Arc::clone(&schema), "user").unwrap();
    via_binary.decode(&encoded);

    let json = user.to_json();
    let mut via_json = Record::new(Arc::clone(&schema), "user").unwrap();
    via_json.from_json(&json);

    assert_eq!(via_binary.to_json(), via_json.to_json());
}

#[test]
fn scenario_json_key_ordering_matches_field_declaration_order() {
    let schema = user_schema();
    let user = build_user(&schema);
    let json = user.to_json();
    let map = json.as_object().unwrap();
    let keys: Vec<&String> = map.keys().collect();
    assert_eq!(keys, vec!["age", "gender", "job", "tasks", "name"]);
}

#[test]
fn scenario_truncated_buffer_decodes_partial_record_cleanly() {
    let schema = user_schema();
    let user = build_user(&schema);
    let encoded = user.encode();

    // age(1) + gender(1) + job length prefix(2), but none of job's bytes
    let cut = &encoded[..4];
    let mut decoded = Record::new(Arc::clone(&schema), "user").unwrap();
    decoded.decode(cut);

    assert_eq!(decoded.get_byte("age"), 30);
    assert_eq!(decoded.get_byte("gender"), 1);
    assert!(!decoded.is_present("job"));
    assert!(!decoded.is_present("tasks"));
    assert!(!decoded.is_present("name"));
}

#[test]
fn scenario_address_book_model_array_of_model_array() {
    let mut bytes = vec![3u8];
    push_model(&mut bytes, "AddressBook", &[("person", FieldType::ModelArray, 1)]);
    push_model(
        &mut bytes,
        "Person",
        &[
            ("name", FieldType::Array, FieldType::Char.code()),
            ("id", FieldType::Int4, 0),
            ("phone", FieldType::ModelArray, 2),
        ],
    );
    push_model(
        &mut bytes,
        "PhoneNumber",
        &[
            ("number", FieldType::Array, FieldType::Char.code()),
            ("type", FieldType::Byte, 0),
        ],
    );
    let schema = Arc::new(Schema::load(&bytes).unwrap());

    let mut alice = Record::new(Arc::clone(&schema), "Person").unwrap();
    let alice_name = alice.new_array_chars("name", b"Alice").unwrap();
    alice.set_array("name", alice_name);
    alice.set_int4("id", 10000);

    let mut number = alice.new_child("phone").unwrap();
    let digits = number.new_array_chars("number", b"123456789").unwrap();
    number.set_array("number", digits);
    number.set_byte("type", 1);

    let mut phones = alice.new_array_records("phone", 1).unwrap();
    phones.set_record(0, number);
    alice.set_array("phone", phones);

    let mut book = Record::new(Arc::clone(&schema), "AddressBook").unwrap();
    let mut people = book.new_array_records("person", 1).unwrap();
    people.set_record(0, alice);
    book.set_array("person", people);

    let encoded = book.encode();
    let mut decoded = Record::new(Arc::clone(&schema), "AddressBook").unwrap();
    decoded.decode(&encoded);

    let people = decoded.get_array("person").unwrap();
    assert_eq!(people.count(), 1);
    let alice_back = people.get_record(0).unwrap();
    assert_eq!(alice_back.get_int4("id"), 10000);
    let phones_back = alice_back.get_array("phone").unwrap();
    assert_eq!(phones_back.count(), 1);
    assert_eq!(
        phones_back.get_record(0).unwrap().get_array("number").unwrap().chars().unwrap(),
        b"123456789"
    );
}

#[test]
fn scenario_int2_big_endian_byte_level() {
    let mut bytes = vec![1u8];
    push_model(&mut bytes, "m", &[("v", FieldType::Int2, 0)]);
    let schema = Arc::new(Schema::load(&bytes).unwrap());
    let mut rec = Record::new(schema, "m").unwrap();
    rec.set_int2("v", -10002);
    assert_eq!(rec.encode(), vec![0xD8, 0xEE]);
}

#[test]
fn scenario_malformed_schema_descriptor_is_rejected() {
    // model_count says 1, but no model bytes follow at all
    let bytes = vec![1u8];
    assert!(Schema::load(&bytes).is_err());
}
