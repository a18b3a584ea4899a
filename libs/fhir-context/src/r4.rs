//! Bundled subset of the FHIR R4 core types
//!
//! Enough of FHIR R4 to work with Patient and Organization records
//! without loading a package: the primitives, the common datatypes and the two
//! resources. Extensions are not modeled as fields, they hang off every element.

use crate::model::InMemoryTypeModel;
use terser_models::{Cardinality, FieldDefinition, TypeDescriptor};

fn one(name: &str, type_name: &str) -> FieldDefinition {
    FieldDefinition::of_type(name, type_name, Cardinality::Single)
}

fn many(name: &str, type_name: &str) -> FieldDefinition {
    FieldDefinition::of_type(name, type_name, Cardinality::Repeated)
}

fn coded(name: &str, codes: &[&str]) -> FieldDefinition {
    one(name, "code").with_required_codes(codes.iter().copied())
}

const ADMINISTRATIVE_GENDER: &[&str] = &["male", "female", "other", "unknown"];

/// Type model holding the bundled R4 types
pub fn core_model() -> InMemoryTypeModel {
    let mut model = InMemoryTypeModel::new().with_primitives();
    for descriptor in datatypes().into_iter().chain(resources()) {
        model.add_type(descriptor);
    }
    model
}

fn datatypes() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::complex("Meta")
            .with_field(one("versionId", "id"))
            .with_field(one("lastUpdated", "instant"))
            .with_field(one("source", "uri"))
            .with_field(many("profile", "canonical"))
            .with_field(many("security", "Coding"))
            .with_field(many("tag", "Coding")),
        TypeDescriptor::complex("Coding")
            .with_field(one("system", "uri"))
            .with_field(one("version", "string"))
            .with_field(one("code", "code"))
            .with_field(one("display", "string"))
            .with_field(one("userSelected", "boolean")),
        TypeDescriptor::complex("CodeableConcept")
            .with_field(many("coding", "Coding"))
            .with_field(one("text", "string")),
        TypeDescriptor::complex("Period")
            .with_field(one("start", "dateTime"))
            .with_field(one("end", "dateTime")),
        TypeDescriptor::complex("Reference")
            .with_field(one("reference", "string"))
            .with_field(one("type", "uri"))
            .with_field(one("identifier", "Identifier"))
            .with_field(one("display", "string")),
        TypeDescriptor::complex("Identifier")
            .with_field(coded("use", &["usual", "official", "temp", "secondary", "old"]))
            .with_field(one("type", "CodeableConcept"))
            .with_field(one("system", "uri"))
            .with_field(one("value", "string"))
            .with_field(one("period", "Period"))
            .with_field(one("assigner", "Reference")),
        TypeDescriptor::complex("HumanName")
            .with_field(coded(
                "use",
                &["usual", "official", "temp", "nickname", "anonymous", "old", "maiden"],
            ))
            .with_field(one("text", "string"))
            .with_field(one("family", "string"))
            .with_field(many("given", "string"))
            .with_field(many("prefix", "string"))
            .with_field(many("suffix", "string"))
            .with_field(one("period", "Period")),
        TypeDescriptor::complex("Address")
            .with_field(coded("use", &["home", "work", "temp", "old", "billing"]))
            .with_field(coded("type", &["postal", "physical", "both"]))
            .with_field(one("text", "string"))
            .with_field(many("line", "string"))
            .with_field(one("city", "string"))
            .with_field(one("district", "string"))
            .with_field(one("state", "string"))
            .with_field(one("postalCode", "string"))
            .with_field(one("country", "string"))
            .with_field(one("period", "Period")),
        TypeDescriptor::complex("ContactPoint")
            .with_field(coded(
                "system",
                &["phone", "fax", "email", "pager", "url", "sms", "other"],
            ))
            .with_field(one("value", "string"))
            .with_field(coded("use", &["home", "work", "temp", "old", "mobile"]))
            .with_field(one("rank", "positiveInt"))
            .with_field(one("period", "Period")),
    ]
}

fn resources() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::resource("Patient")
            .with_field(one("id", "id"))
            .with_field(one("meta", "Meta"))
            .with_field(one("implicitRules", "uri"))
            .with_field(one("language", "code"))
            .with_field(many("identifier", "Identifier"))
            .with_field(one("active", "boolean"))
            .with_field(many("name", "HumanName"))
            .with_field(many("telecom", "ContactPoint"))
            .with_field(coded("gender", ADMINISTRATIVE_GENDER))
            .with_field(one("birthDate", "date"))
            .with_field(one("deceasedBoolean", "boolean"))
            .with_field(one("deceasedDateTime", "dateTime"))
            .with_field(many("address", "Address"))
            .with_field(one("maritalStatus", "CodeableConcept"))
            .with_field(one("multipleBirthBoolean", "boolean"))
            .with_field(one("multipleBirthInteger", "integer"))
            .with_field(many("contact", "Patient.contact"))
            .with_field(many("generalPractitioner", "Reference"))
            .with_field(one("managingOrganization", "Reference")),
        TypeDescriptor::complex("Patient.contact")
            .with_field(many("relationship", "CodeableConcept"))
            .with_field(one("name", "HumanName"))
            .with_field(many("telecom", "ContactPoint"))
            .with_field(one("address", "Address"))
            .with_field(coded("gender", ADMINISTRATIVE_GENDER))
            .with_field(one("organization", "Reference"))
            .with_field(one("period", "Period")),
        TypeDescriptor::resource("Organization")
            .with_field(one("id", "id"))
            .with_field(one("meta", "Meta"))
            .with_field(many("identifier", "Identifier"))
            .with_field(one("active", "boolean"))
            .with_field(many("type", "CodeableConcept"))
            .with_field(one("name", "string"))
            .with_field(many("alias", "string"))
            .with_field(many("telecom", "ContactPoint"))
            .with_field(many("address", "Address"))
            .with_field(one("partOf", "Reference")),
    ]
}
