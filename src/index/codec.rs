// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index key codec
//!
//! Every indexed entity is flattened into a single string of `/`-separated
//! fields with a fixed number of separators per schema, so decoding is pure
//! splitting. List fields join their items with `,`. Modifiers occupy the last
//! two characters, one per 16-bit half, each stored as `U+10000 + half` so the
//! character is always a valid scalar value and never collides with a separator.

use super::IndexCategory;
use crate::modifiers::Modifiers;

pub const SEPARATOR: char = '/';
pub const LIST_SEPARATOR: char = ',';
const MODIFIER_BASE: u32 = 0x1_0000;

/// `simpleName/qualification/superTypes/MM`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDeclKey {
    pub simple_name: String,
    pub qualification: String,
    pub super_types: Vec<String>,
    pub modifiers: Modifiers,
}

/// `selector/paramTypes/paramNames/returnType/declaringType/MM`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodDeclKey {
    pub selector: String,
    pub parameter_types: Vec<String>,
    pub parameter_names: Vec<String>,
    pub return_type: String,
    pub declaring_type: String,
    pub modifiers: Modifiers,
}

/// `selector/argCount`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodRefKey {
    pub selector: String,
    pub arg_count: usize,
}

/// `typeSimpleName/qualification/paramTypes/paramNames/MM`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructorDeclKey {
    pub type_name: String,
    pub qualification: String,
    pub parameter_types: Vec<String>,
    pub parameter_names: Vec<String>,
    pub modifiers: Modifiers,
}

/// `typeSimpleName/argCount`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructorRefKey {
    pub type_name: String,
    pub arg_count: usize,
}

/// `name/declaringType/fieldType/MM`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDeclKey {
    pub name: String,
    pub declaring_type: String,
    pub field_type: String,
    pub modifiers: Modifiers,
}

/// Whether a super-type reference names the superclass or an implemented/extended interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuperKind {
    #[default]
    Class,
    Interface,
}

impl SuperKind {
    fn as_char(self) -> char {
        match self {
            SuperKind::Class => 'C',
            SuperKind::Interface => 'I',
        }
    }

    fn from_code(text: &str) -> SuperKind {
        if text == "I" {
            SuperKind::Interface
        } else {
            SuperKind::Class
        }
    }
}

/// `superSimpleName/superQualification/simpleName/qualification/kind/MM`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuperRefKey {
    pub super_simple_name: String,
    pub super_qualification: String,
    pub simple_name: String,
    pub qualification: String,
    pub kind: SuperKind,
    pub modifiers: Modifiers,
}

/// A key decoded back into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedKey {
    TypeDecl(TypeDeclKey),
    MethodDecl(MethodDeclKey),
    MethodRef(MethodRefKey),
    ConstructorDecl(ConstructorDeclKey),
    ConstructorRef(ConstructorRefKey),
    FieldDecl(FieldDeclKey),
    SuperRef(SuperRefKey),
    PackageDecl(String),
    Ref(String),
}

impl DecodedKey {
    pub fn category(&self) -> IndexCategory {
        match self {
            DecodedKey::TypeDecl(_) => IndexCategory::TypeDecl,
            DecodedKey::MethodDecl(_) => IndexCategory::MethodDecl,
            DecodedKey::MethodRef(_) => IndexCategory::MethodRef,
            DecodedKey::ConstructorDecl(_) => IndexCategory::ConstructorDecl,
            DecodedKey::ConstructorRef(_) => IndexCategory::ConstructorRef,
            DecodedKey::FieldDecl(_) => IndexCategory::FieldDecl,
            DecodedKey::SuperRef(_) => IndexCategory::SuperRef,
            DecodedKey::PackageDecl(_) => IndexCategory::PackageDecl,
            DecodedKey::Ref(_) => IndexCategory::Ref,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            DecodedKey::TypeDecl(k) => encode_type_decl(k),
            DecodedKey::MethodDecl(k) => encode_method_decl(k),
            DecodedKey::MethodRef(k) => encode_method_ref(k),
            DecodedKey::ConstructorDecl(k) => encode_constructor_decl(k),
            DecodedKey::ConstructorRef(k) => encode_constructor_ref(k),
            DecodedKey::FieldDecl(k) => encode_field_decl(k),
            DecodedKey::SuperRef(k) => encode_super_ref(k),
            DecodedKey::PackageDecl(name) | DecodedKey::Ref(name) => name.clone(),
        }
    }
}

/// Decode a key read from the given category.
pub fn decode(category: IndexCategory, key: &str) -> DecodedKey {
    match category {
        IndexCategory::TypeDecl => DecodedKey::TypeDecl(decode_type_decl(key)),
        IndexCategory::MethodDecl => DecodedKey::MethodDecl(decode_method_decl(key)),
        IndexCategory::MethodRef => DecodedKey::MethodRef(decode_method_ref(key)),
        IndexCategory::ConstructorDecl => DecodedKey::ConstructorDecl(decode_constructor_decl(key)),
        IndexCategory::ConstructorRef => DecodedKey::ConstructorRef(decode_constructor_ref(key)),
        IndexCategory::FieldDecl => DecodedKey::FieldDecl(decode_field_decl(key)),
        IndexCategory::SuperRef => DecodedKey::SuperRef(decode_super_ref(key)),
        IndexCategory::PackageDecl => DecodedKey::PackageDecl(key.to_string()),
        IndexCategory::Ref => DecodedKey::Ref(key.to_string()),
    }
}

pub fn encode_type_decl(key: &TypeDeclKey) -> String {
    let mut out = String::new();
    push_field(&mut out, &key.simple_name);
    push_field(&mut out, &key.qualification);
    push_field(&mut out, &join_list(&key.super_types));
    push_modifiers(&mut out, key.modifiers);
    out
}

pub fn decode_type_decl(key: &str) -> TypeDeclKey {
    let (fields, modifiers) = split_fields(key, 3);
    TypeDeclKey {
        simple_name: fields[0].to_string(),
        qualification: fields[1].to_string(),
        super_types: split_list(fields[2]),
        modifiers,
    }
}

pub fn encode_method_decl(key: &MethodDeclKey) -> String {
    let mut out = String::new();
    push_field(&mut out, &key.selector);
    push_field(&mut out, &join_list(&key.parameter_types));
    push_field(&mut out, &join_list(&key.parameter_names));
    push_field(&mut out, &key.return_type);
    push_field(&mut out, &key.declaring_type);
    push_modifiers(&mut out, key.modifiers);
    out
}

pub fn decode_method_decl(key: &str) -> MethodDeclKey {
    let (fields, modifiers) = split_fields(key, 5);
    MethodDeclKey {
        selector: fields[0].to_string(),
        parameter_types: split_list(fields[1]),
        parameter_names: split_list(fields[2]),
        return_type: fields[3].to_string(),
        declaring_type: fields[4].to_string(),
        modifiers,
    }
}

pub fn encode_method_ref(key: &MethodRefKey) -> String {
    format!("{}{}{}", key.selector, SEPARATOR, key.arg_count)
}

pub fn decode_method_ref(key: &str) -> MethodRefKey {
    let (selector, count) = split_count(key);
    MethodRefKey {
        selector: selector.to_string(),
        arg_count: count,
    }
}

pub fn encode_constructor_decl(key: &ConstructorDeclKey) -> String {
    let mut out = String::new();
    push_field(&mut out, &key.type_name);
    push_field(&mut out, &key.qualification);
    push_field(&mut out, &join_list(&key.parameter_types));
    push_field(&mut out, &join_list(&key.parameter_names));
    push_modifiers(&mut out, key.modifiers);
    out
}

pub fn decode_constructor_decl(key: &str) -> ConstructorDeclKey {
    let (fields, modifiers) = split_fields(key, 4);
    ConstructorDeclKey {
        type_name: fields[0].to_string(),
        qualification: fields[1].to_string(),
        parameter_types: split_list(fields[2]),
        parameter_names: split_list(fields[3]),
        modifiers,
    }
}

pub fn encode_constructor_ref(key: &ConstructorRefKey) -> String {
    format!("{}{}{}", key.type_name, SEPARATOR, key.arg_count)
}

pub fn decode_constructor_ref(key: &str) -> ConstructorRefKey {
    let (type_name, count) = split_count(key);
    ConstructorRefKey {
        type_name: type_name.to_string(),
        arg_count: count,
    }
}

pub fn encode_field_decl(key: &FieldDeclKey) -> String {
    let mut out = String::new();
    push_field(&mut out, &key.name);
    push_field(&mut out, &key.declaring_type);
    push_field(&mut out, &key.field_type);
    push_modifiers(&mut out, key.modifiers);
    out
}

pub fn decode_field_decl(key: &str) -> FieldDeclKey {
    let (fields, modifiers) = split_fields(key, 3);
    FieldDeclKey {
        name: fields[0].to_string(),
        declaring_type: fields[1].to_string(),
        field_type: fields[2].to_string(),
        modifiers,
    }
}

pub fn encode_super_ref(key: &SuperRefKey) -> String {
    let mut out = String::new();
    push_field(&mut out, &key.super_simple_name);
    push_field(&mut out, &key.super_qualification);
    push_field(&mut out, &key.simple_name);
    push_field(&mut out, &key.qualification);
    out.push(key.kind.as_char());
    out.push(SEPARATOR);
    push_modifiers(&mut out, key.modifiers);
    out
}

pub fn decode_super_ref(key: &str) -> SuperRefKey {
    let (fields, modifiers) = split_fields(key, 5);
    SuperRefKey {
        super_simple_name: fields[0].to_string(),
        super_qualification: fields[1].to_string(),
        simple_name: fields[2].to_string(),
        qualification: fields[3].to_string(),
        kind: SuperKind::from_code(fields[4]),
        modifiers,
    }
}

/// The leading fixed fragment `name/` that every key of an entity called `name` starts with.
pub fn name_prefix(name: &str) -> String {
    format!("{}{}", name, SEPARATOR)
}

fn push_field(out: &mut String, value: &str) {
    out.push_str(value);
    out.push(SEPARATOR);
}

fn push_modifiers(out: &mut String, modifiers: Modifiers) {
    let bits = modifiers.bits();
    out.push(modifier_char(bits & 0xFFFF));
    out.push(modifier_char(bits >> 16));
}

fn modifier_char(half: u32) -> char {
    // 0x10000..=0x1FFFF are all valid scalar values
    char::from_u32(MODIFIER_BASE + half).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn modifier_half(c: Option<char>) -> u32 {
    c.map(|c| (c as u32).saturating_sub(MODIFIER_BASE) & 0xFFFF)
        .unwrap_or(0)
}

/// Split off `count` separator-terminated fields; whatever follows the last
/// separator holds the modifier characters. Missing fields decode as empty.
fn split_fields(key: &str, count: usize) -> (Vec<&str>, Modifiers) {
    let mut fields = Vec::with_capacity(count);
    let mut rest = key;
    for _ in 0..count {
        match rest.find(SEPARATOR) {
            Some(pos) => {
                fields.push(&rest[..pos]);
                rest = &rest[pos + SEPARATOR.len_utf8()..];
            }
            None => {
                fields.push(rest);
                rest = "";
            }
        }
    }
    let mut chars = rest.chars();
    let low = modifier_half(chars.next());
    let high = modifier_half(chars.next());
    (fields, Modifiers::from_bits_retain(low | (high << 16)))
}

fn split_count(key: &str) -> (&str, usize) {
    match key.rfind(SEPARATOR) {
        Some(pos) => (&key[..pos], key[pos + 1..].parse().unwrap_or(0)),
        None => (key, 0),
    }
}

fn join_list(items: &[String]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        out.push_str(item);
    }
    out
}

fn split_list(field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(LIST_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn method_decl_round_trip() {
        let key = MethodDeclKey {
            selector: "foo".into(),
            parameter_types: strings(&["int", "String[]"]),
            parameter_names: strings(&["x", "rest"]),
            return_type: "void".into(),
            declaring_type: "Widget".into(),
            modifiers: Modifiers::PUBLIC | Modifiers::SYNCHRONIZED,
        };
        let encoded = encode_method_decl(&key);
        assert!(encoded.starts_with("foo/int,String[]/x,rest/void/Widget/"));
        assert_eq!(decode_method_decl(&encoded), key);
    }

    #[test]
    fn empty_fields_keep_separator_count() {
        let key = MethodDeclKey {
            selector: "run".into(),
            ..MethodDeclKey::default()
        };
        let encoded = encode_method_decl(&key);
        assert_eq!(encoded.matches(SEPARATOR).count(), 5);
        assert_eq!(decode_method_decl(&encoded), key);
    }

    #[test]
    fn modifiers_use_both_halves() {
        let key = TypeDeclKey {
            simple_name: "Widget".into(),
            qualification: "com.acme".into(),
            super_types: strings(&["Base", "Runnable"]),
            modifiers: Modifiers::PUBLIC | Modifiers::DEPRECATED | Modifiers::DEFAULT,
        };
        let encoded = encode_type_decl(&key);
        let tail: Vec<char> = encoded.chars().rev().take(2).collect();
        assert_ne!(tail[0], SEPARATOR);
        assert_ne!(tail[1], SEPARATOR);
        let decoded = decode_type_decl(&encoded);
        assert_eq!(decoded, key);
        assert!(decoded.modifiers.contains(Modifiers::DEPRECATED));
    }

    #[test]
    fn every_schema_round_trips() {
        let keys = vec![
            DecodedKey::TypeDecl(TypeDeclKey {
                simple_name: "Inner".into(),
                qualification: "a.b.Outer".into(),
                super_types: Vec::new(),
                modifiers: Modifiers::STATIC,
            }),
            DecodedKey::MethodRef(MethodRefKey {
                selector: "foo".into(),
                arg_count: 3,
            }),
            DecodedKey::ConstructorDecl(ConstructorDeclKey {
                type_name: "Widget".into(),
                qualification: "com.acme".into(),
                parameter_types: strings(&["int"]),
                parameter_names: strings(&["size"]),
                modifiers: Modifiers::PROTECTED,
            }),
            DecodedKey::ConstructorRef(ConstructorRefKey {
                type_name: "Widget".into(),
                arg_count: 0,
            }),
            DecodedKey::FieldDecl(FieldDeclKey {
                name: "count".into(),
                declaring_type: "Widget".into(),
                field_type: "long".into(),
                modifiers: Modifiers::PRIVATE | Modifiers::VOLATILE,
            }),
            DecodedKey::SuperRef(SuperRefKey {
                super_simple_name: "Runnable".into(),
                super_qualification: "java.lang".into(),
                simple_name: "Task".into(),
                qualification: "com.acme".into(),
                kind: SuperKind::Interface,
                modifiers: Modifiers::FINAL,
            }),
            DecodedKey::PackageDecl("com.acme".into()),
            DecodedKey::Ref("Widget".into()),
        ];
        for key in keys {
            let encoded = key.encode();
            assert_eq!(decode(key.category(), &encoded), key, "key {:?}", encoded);
        }
    }

    #[test]
    fn decoding_is_lexical_only() {
        let decoded = decode_field_decl("count");
        assert_eq!(decoded.name, "count");
        assert!(decoded.declaring_type.is_empty());
        assert_eq!(decoded.modifiers, Modifiers::empty());
    }

    #[test]
    fn name_prefix_is_structural() {
        let key = encode_field_decl(&FieldDeclKey {
            name: "count".into(),
            ..FieldDeclKey::default()
        });
        assert!(key.starts_with(&name_prefix("count")));
        assert!(!key.starts_with(&name_prefix("coun")));
    }
}
