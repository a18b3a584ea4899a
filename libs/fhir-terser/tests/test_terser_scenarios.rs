//! End-to-end behavior of the engine over the bundled R4 Patient model:
//! path access, factories, cloning and the merge/replace family.

use std::sync::{Arc, OnceLock};
use terser::{
    equals, equals_records, r4, CompositeValue, Element, Extension, PrimitiveValue, Resource,
    ResourceHelper, Terser, EXCLUDE_IDS_META_AND_EMPTY,
};

const CREATE_TIMESTAMP: &str = "http://hapifhir.io/extensions/address#create-timestamp";

fn terser() -> &'static Terser {
    static TERSER: OnceLock<Terser> = OnceLock::new();
    TERSER.get_or_init(|| Terser::new(Arc::new(r4::core_model())))
}

fn string(value: &str) -> PrimitiveValue {
    PrimitiveValue::string("string", value)
}

fn timestamp_extension(url: &str, literal: &str) -> Extension {
    let value = terser()
        .new_primitive("dateTime", Some(literal))
        .expect("valid dateTime");
    Extension::new(url, Some(value))
}

fn address(lines: &[&str]) -> CompositeValue {
    lines
        .iter()
        .fold(CompositeValue::new("Address"), |a, line| a.with("line", string(line)))
}

fn human_name(family: Option<&str>, given: &[&str]) -> CompositeValue {
    let mut name = CompositeValue::new("HumanName");
    if let Some(family) = family {
        name = name.with("family", string(family));
    }
    given
        .iter()
        .fold(name, |n, g| n.with("given", string(g)))
}

fn patient() -> Resource {
    terser().new_resource("Patient", None).expect("Patient is a resource")
}

fn lines_of(value: &Element) -> Vec<&str> {
    value
        .as_composite()
        .map(|a| a.values("line").iter().filter_map(Element::as_str).collect())
        .unwrap_or_default()
}

fn family_of(value: &Element) -> Option<&str> {
    value.as_composite()?.values("family").first()?.as_str()
}

#[test]
fn clone_identifier_into_resource() {
    let terser = terser();
    let identifier: Element = CompositeValue::new("Identifier")
        .with("system", PrimitiveValue::string("uri", "http://org.com/sys"))
        .with("value", string("123"))
        .into();
    let mut p1 = patient();
    terser.set(&mut p1, "identifier", identifier.clone()).unwrap();

    let mut p2 = patient();
    assert!(terser.clone_identifier_into(&identifier, &mut p2).unwrap());

    let cloned = terser.get_values(&p2, "identifier").unwrap();
    assert_eq!(cloned.len(), 1);
    assert!(equals(cloned[0], terser.get_first(&p1, "identifier").unwrap()));
    assert_eq!(
        terser.get_first(&p2, "identifier.system").and_then(Element::as_str),
        Some("http://org.com/sys")
    );

    // already present: not duplicated
    assert!(!terser.clone_identifier_into(&identifier, &mut p2).unwrap());
    assert_eq!(terser.get_values(&p2, "identifier").unwrap().len(), 1);
}

#[test]
fn clone_identifier_via_helper() {
    let terser = terser();
    let mut p1 = ResourceHelper::new(terser, "Patient").unwrap();
    p1.set_field("identifier.system", "http://org.com/sys")
        .unwrap()
        .set_field("identifier.value", "123")
        .unwrap();
    assert_eq!(p1.field_values("identifier").unwrap().len(), 1);

    let mut p2 = ResourceHelper::new(terser, "Patient").unwrap();
    let identifier = p1.field_value("identifier").unwrap().clone();
    terser
        .clone_identifier_into(&identifier, p2.resource_mut())
        .unwrap();

    assert_eq!(p2.field_values("identifier").unwrap().len(), 1);
    assert!(equals(
        p1.field_value("identifier").unwrap(),
        p2.field_value("identifier").unwrap()
    ));
    assert!(p2.field_value("address").is_none());
}

#[test]
fn set_fields_via_helper() {
    let terser = terser();
    let mut helper = ResourceHelper::new(terser, "Patient").unwrap();
    helper
        .set_field_typed("active", "boolean", "true")
        .unwrap()
        .set_field_typed("birthDate", "date", "1999-01-01")
        .unwrap()
        .set_field_typed("gender", "code", "male")
        .unwrap();

    let patient = helper.into_resource();
    assert_eq!(
        terser
            .get_first(&patient, "active")
            .and_then(|e| e.data()?.as_bool()),
        Some(true)
    );
    assert_eq!(
        terser.get_first(&patient, "gender").and_then(Element::as_str),
        Some("male")
    );
    let check = terser.new_element("date", Some("1999-01-01")).unwrap();
    assert!(equals(terser.get_first(&patient, "birthDate").unwrap(), &check));
}

#[test]
fn field_exists() {
    let terser = terser();
    let patient = terser.new_resource("Patient", None).unwrap();
    assert!(terser.field_exists(&patient, "identifier"));
    assert!(!terser.field_exists(&patient, "randomFieldName"));
}

#[test]
fn merge_fields_except_id_and_meta() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(None, &["Sigizmund"]))
        .unwrap();
    terser.set_literal(&mut p1, "id", "p1").unwrap();
    terser
        .set_literal(&mut p1, "meta.versionId", "7")
        .unwrap();

    let mut p2 = patient();
    terser.merge_fields_except_id_and_meta(&p1, &mut p2).unwrap();

    assert!(!terser.has_values(&p2, "identifier"));
    assert!(!terser.has_values(&p2, "id"));
    assert!(!terser.has_values(&p2, "meta"));
    assert_eq!(p2.id(), None);
    let names = terser.get_values(&p2, "name").unwrap();
    assert_eq!(names.len(), 1);
    assert!(equals(names[0], terser.get_first(&p1, "name").unwrap()));
}

#[test]
fn merge_all_fields_includes_identity() {
    let terser = terser();
    let mut p1 = patient();
    terser.set_literal(&mut p1, "id", "p1").unwrap();
    let mut p2 = patient();

    terser.merge_all_fields(&p1, &mut p2).unwrap();
    assert_eq!(p2.id(), Some("p1"));
}

#[test]
fn merge_appends_names_that_differ() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(None, &["Joe", "George"]))
        .unwrap();
    let mut p2 = patient();
    terser
        .set(&mut p2, "name", human_name(None, &["Jeff", "George"]))
        .unwrap();

    terser.merge_all_fields(&p1, &mut p2).unwrap();

    let names = terser.get_values(&p2, "name").unwrap();
    assert_eq!(names.len(), 2);
    for name in &names {
        assert_eq!(name.as_composite().unwrap().values("given").len(), 2);
    }
    // original entries stay first
    assert_eq!(
        names[0].as_composite().unwrap().values("given")[0].as_str(),
        Some("Jeff")
    );
}

#[test]
fn merge_skips_duplicate_names() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(None, &["Jim", "George"]))
        .unwrap();
    let mut p2 = patient();
    terser
        .set(&mut p2, "name", human_name(None, &["Jim", "George"]))
        .unwrap();

    terser.merge_all_fields(&p1, &mut p2).unwrap();

    let names = terser.get_values(&p2, "name").unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].as_composite().unwrap().values("given").len(), 2);
}

#[test]
fn merge_address_with_extensions() {
    let terser = terser();
    let ext = timestamp_extension(CREATE_TIMESTAMP, "2021-01-02T11:13:15");

    let mut p1 = patient();
    terser
        .set(
            &mut p1,
            "address",
            address(&["10 Main Street"])
                .with("city", string("Hamilton"))
                .with("state", string("ON"))
                .with("postalCode", string("Z0Z0Z0"))
                .with("country", string("Canada"))
                .with_extension(ext.clone()),
        )
        .unwrap();
    let mut p2 = patient();
    terser
        .set(
            &mut p2,
            "address",
            address(&["10 Lenin Street"])
                .with("city", string("Severodvinsk"))
                .with("country", string("Russia")),
        )
        .unwrap();

    terser.merge_field("address", &p1, &mut p2).unwrap();

    let addresses = terser.get_values(&p2, "address").unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(lines_of(addresses[0]), vec!["10 Lenin Street"]);
    assert_eq!(lines_of(addresses[1]), vec!["10 Main Street"]);
    assert!(addresses[1].has_extension());

    // same line, different extension: still a distinct entry
    let mut p1 = patient();
    terser
        .set(
            &mut p1,
            "address",
            address(&["10 Main Street"]).with_extension(ext),
        )
        .unwrap();
    let mut p2 = patient();
    terser
        .set(
            &mut p2,
            "address",
            address(&["10 Main Street"])
                .with_extension(timestamp_extension("demo", "2021-01-02")),
        )
        .unwrap();

    terser.merge_field("address", &p1, &mut p2).unwrap();

    let addresses = terser.get_values(&p2, "address").unwrap();
    assert_eq!(addresses.len(), 2);
    assert!(addresses[0].has_extension());
    assert!(addresses[1].has_extension());
}

#[test]
fn replace_address_with_extensions() {
    let terser = terser();
    let ext = timestamp_extension(CREATE_TIMESTAMP, "2021-01-02T11:13:15");

    let mut p1 = patient();
    terser
        .set(
            &mut p1,
            "address",
            address(&["10 Main Street"])
                .with("city", string("Hamilton"))
                .with_extension(ext),
        )
        .unwrap();
    let mut p2 = patient();
    terser
        .set(
            &mut p2,
            "address",
            address(&["10 Lenin Street"]).with("city", string("Severodvinsk")),
        )
        .unwrap();

    terser.replace_field("address", &p1, &mut p2).unwrap();

    let addresses = terser.get_values(&p2, "address").unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(lines_of(addresses[0]), vec!["10 Main Street"]);
    assert!(addresses[0].has_extension());
}

#[test]
fn merge_similar_addresses() {
    let terser = terser();
    let ext = timestamp_extension(CREATE_TIMESTAMP, "2021-01-02T11:13:15");
    let hamilton = |postal_code: &str| {
        address(&["10 Main Street"])
            .with("city", string("Hamilton"))
            .with("state", string("ON"))
            .with("postalCode", string(postal_code))
            .with("country", string("Canada"))
            .with_extension(ext.clone())
    };

    let mut p1 = patient();
    terser.set(&mut p1, "address", hamilton("Z0Z0Z0")).unwrap();
    let mut p2 = patient();
    terser.set(&mut p2, "address", hamilton("Z0Z0Z1")).unwrap();

    terser.merge_field("address", &p1, &mut p2).unwrap();

    let addresses = terser.get_values(&p2, "address").unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(lines_of(addresses[0]), vec!["10 Main Street"]);
    assert_eq!(lines_of(addresses[1]), vec!["10 Main Street"]);
    assert!(addresses[1].has_extension());

    // merging the identical address again changes nothing
    let before = p2.clone();
    terser.merge_field("address", &p1, &mut p2).unwrap();
    assert!(equals_records(&before, &p2));
}

#[test]
fn equals_records_compares_deeply() {
    let terser = terser();
    let mut p1 = patient();
    let mut p2 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("family"), &["asd"]))
        .unwrap();
    terser
        .set(&mut p2, "name", human_name(Some("family"), &["asd"]))
        .unwrap();
    assert!(equals_records(&p1, &p2));

    let mut p3 = patient();
    terser
        .set(&mut p3, "name", human_name(Some("family"), &["asd1"]))
        .unwrap();
    assert!(!equals_records(&p1, &p3));
}

#[test]
fn has_values_and_get_values() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("Doe"), &[]))
        .unwrap();

    assert!(terser.has_values(&p1, "name"));
    assert!(!terser.has_values(&p1, "address"));

    assert_eq!(family_of(terser.get_first(&p1, "name").unwrap()), Some("Doe"));
    assert!(!terser.get_values(&p1, "name").unwrap().is_empty());
    assert!(terser.get_values(&p1, "whoaIsThatReal").is_none());
    assert!(terser.get_first(&p1, "whoaIsThatReal").is_none());
}

#[test]
fn replace_field() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("Doe"), &[]))
        .unwrap();
    let mut p2 = patient();
    terser
        .set(&mut p2, "name", human_name(Some("Smith"), &[]))
        .unwrap();

    terser.replace_field("name", &p1, &mut p2).unwrap();

    let names = terser.get_values(&p2, "name").unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(family_of(names[0]), Some("Doe"));
}

#[test]
fn replace_fields_by_predicate() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("Doe"), &[]))
        .unwrap();
    terser.set_literal(&mut p1, "gender", "male").unwrap();
    terser.set_literal(&mut p1, "id", "source-id").unwrap();

    let mut p2 = patient();
    terser
        .set(&mut p2, "name", human_name(Some("Smith"), &[]))
        .unwrap();
    terser.set_literal(&mut p2, "birthDate", "1970-01-01").unwrap();
    terser.set_literal(&mut p2, "id", "target-id").unwrap();

    terser
        .replace_fields_by_predicate(&p1, &mut p2, EXCLUDE_IDS_META_AND_EMPTY)
        .unwrap();

    let names = terser.get_values(&p2, "name").unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(family_of(names[0]), Some("Doe"));
    assert_eq!(
        terser.get_first(&p2, "gender").and_then(Element::as_str),
        Some("male")
    );
    // empty in source and identity fields are left alone
    assert_eq!(
        terser
            .get_first(&p2, "birthDate")
            .and_then(|e| e.as_primitive()?.to_literal()),
        Some("1970-01-01".to_string())
    );
    assert_eq!(p2.id(), Some("target-id"));
}

#[test]
fn clear_field() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("Doe"), &[]))
        .unwrap();

    terser.clear(&mut p1, "name").unwrap();
    assert_eq!(terser.get_values(&p1, "name").unwrap().len(), 0);
    assert!(!terser.has_values(&p1, "name"));
}

#[test]
fn set_field() {
    let terser = terser();
    let mut p1 = patient();
    let address = CompositeValue::new("Address").with("city", string("CITY"));

    terser.set(&mut p1, "address", address).unwrap();

    let addresses = terser.get_values(&p1, "address").unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(
        addresses[0].as_composite().unwrap().values("city")[0].as_str(),
        Some("CITY")
    );
}

#[test]
fn clone_resource() {
    let terser = terser();
    let mut p1 = patient();
    terser
        .set(&mut p1, "name", human_name(Some("Doe"), &["Joe"]))
        .unwrap();
    p1.extensions_mut()
        .push(timestamp_extension(CREATE_TIMESTAMP, "2021-01-02"));

    let mut p2 = terser.clone_resource(&p1).unwrap();
    assert!(equals_records(&p1, &p2));
    assert_eq!(p2, p1);

    // the clone shares nothing with its source
    terser.set_literal(&mut p2, "name.given", "Jack").unwrap();
    assert_eq!(terser.get_values(&p1, "name.given").unwrap().len(), 1);
    assert!(!equals_records(&p1, &p2));
}

#[test]
fn new_element() {
    let terser = terser();
    assert!(terser.new_element("string", None).is_ok());
    assert_eq!(
        terser
            .new_element("integer", Some("1"))
            .unwrap()
            .data()
            .and_then(|d| d.as_integer()),
        Some(1)
    );
    assert!(terser
        .new_element("integer", None)
        .unwrap()
        .data()
        .is_none());
}

#[test]
fn new_resource() {
    let terser = terser();
    assert!(terser.new_resource("Patient", None).is_ok());
    assert!(terser.new_resource("Patient", Some("ignored")).is_ok());
}

fn families(terser: &Terser, patient: &Resource) -> Vec<String> {
    terser
        .get_values(patient, "name.family")
        .unwrap_or_default()
        .into_iter()
        .filter_map(Element::as_str)
        .map(str::to_string)
        .collect()
}

fn patient_with_names(names: Vec<CompositeValue>) -> Resource {
    let mut patient = patient();
    for name in names {
        terser().set(&mut patient, "name", name).unwrap();
    }
    patient
}

#[test]
fn replace_nested_field_keeps_every_source_value() {
    let terser = terser();
    let source = patient_with_names(vec![
        human_name(Some("Doe"), &[]),
        human_name(Some("Roe"), &[]),
    ]);
    let mut target = patient_with_names(vec![human_name(Some("Smith"), &["Jim"])]);

    terser.replace_field("name.family", &source, &mut target).unwrap();

    assert_eq!(families(terser, &target), families(terser, &source));
    assert_eq!(families(terser, &target), vec!["Doe", "Roe"]);
    let names = terser.get_values(&target, "name").unwrap();
    assert_eq!(names.len(), 2);
    // siblings of the replaced field stay in place
    assert_eq!(
        names[0].as_composite().unwrap().values("given")[0].as_str(),
        Some("Jim")
    );
}

#[test]
fn replace_nested_field_clears_surplus_target_entries() {
    let terser = terser();
    let source = patient_with_names(vec![human_name(Some("Doe"), &[])]);
    let mut target = patient_with_names(vec![
        human_name(Some("Smith"), &[]),
        human_name(Some("Jones"), &["Tom"]),
    ]);

    terser.replace_field("name.family", &source, &mut target).unwrap();

    assert_eq!(families(terser, &target), vec!["Doe"]);
    assert_eq!(terser.get_values(&target, "name").unwrap().len(), 2);
    assert_eq!(
        terser.get_values(&target, "name.given").unwrap().len(),
        1
    );
}

#[test]
fn merge_nested_single_field_pairs_entries() {
    let terser = terser();
    let source = patient_with_names(vec![
        human_name(Some("Doe"), &[]),
        human_name(Some("Roe"), &[]),
    ]);
    let mut target = patient_with_names(vec![human_name(Some("Smith"), &["Jim"])]);

    terser.merge_field("name.family", &source, &mut target).unwrap();

    assert_eq!(families(terser, &target), vec!["Doe", "Roe"]);
    let names = terser.get_values(&target, "name").unwrap();
    assert_eq!(
        names[0].as_composite().unwrap().values("given")[0].as_str(),
        Some("Jim")
    );

    let before = target.clone();
    terser.merge_field("name.family", &source, &mut target).unwrap();
    assert!(equals_records(&before, &target));
}

#[test]
fn merge_nested_repeated_field() {
    let terser = terser();
    let source = patient_with_names(vec![human_name(None, &["Joe", "George"])]);
    let mut target = patient_with_names(vec![human_name(None, &["George"])]);

    terser.merge_field("name.given", &source, &mut target).unwrap();

    let given: Vec<_> = terser
        .get_values(&target, "name.given")
        .unwrap()
        .into_iter()
        .filter_map(Element::as_str)
        .collect();
    assert_eq!(given, vec!["George", "Joe"]);
    assert_eq!(terser.get_values(&target, "name").unwrap().len(), 1);
}

#[test]
fn merge_nested_field_creates_containers_only_when_needed() {
    let terser = terser();
    let mut source = patient();
    terser
        .set_literal(&mut source, "contact.name.family", "Doe")
        .unwrap();

    let mut target = patient();
    terser
        .merge_field("contact.name.family", &patient(), &mut target)
        .unwrap();
    assert!(!terser.has_values(&target, "contact"));

    terser
        .merge_field("contact.name.family", &source, &mut target)
        .unwrap();
    assert_eq!(terser.get_values(&target, "contact").unwrap().len(), 1);
    assert_eq!(
        terser
            .get_first(&target, "contact.name.family")
            .and_then(Element::as_str),
        Some("Doe")
    );
}

#[test]
fn clear_removes_every_declared_field() {
    let terser = terser();
    let check = |path: &str, type_name: &str| {
        let mut patient = patient();
        let value = terser.new_element(type_name, None).unwrap();
        terser.set(&mut patient, path, value).unwrap();
        assert!(terser.has_values(&patient, path), "'{}' was not set", path);

        terser.clear(&mut patient, path).unwrap();
        assert!(!terser.has_values(&patient, path), "'{}' still has values", path);
    };

    for field in terser.type_descriptor("Patient").unwrap().fields() {
        check(&field.name, &field.type_name);
    }
    for field in terser.type_descriptor("Patient.contact").unwrap().fields() {
        check(&format!("contact.{}", field.name), &field.type_name);
    }
}
