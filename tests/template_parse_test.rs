// Template validation, matching and merging through the public API

use entitybroker::{
    domain::template::{
        default_preprocessed_templates, default_template, find_extension, merge_template,
        parse_template, preprocess_templates, Template, TemplateKey,
    },
    error::{SyntaxErrorKind, TemplateError},
    validation::{validate_template, validate_template_key},
};
use std::collections::HashMap;

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_default_templates_validate() {
    for key in TemplateKey::PARSE_ORDER {
        let template = default_template(key.as_str()).unwrap();
        assert!(validate_template(template).is_ok(), "{} should be valid", template);
    }
    assert!(default_template("browse").is_err());
}

#[test]
fn test_validate_template_key() {
    assert_eq!(validate_template_key("edit").unwrap(), TemplateKey::Edit);
    assert!(matches!(
        validate_template_key("browse"),
        Err(TemplateError::UnknownTemplateKey(_))
    ));
}

#[test]
fn test_find_extension() {
    let split = find_extension("noextension");
    assert_eq!(split.original, "noextension");
    assert_eq!(split.base, "noextension");
    assert_eq!(split.extension, None);

    let split = find_extension("test.xml");
    assert_eq!(split.original, "test.xml");
    assert_eq!(split.base, "test");
    assert_eq!(split.extension.as_deref(), Some("xml"));

    let split = find_extension("/complex/stuff/test.other.json");
    assert_eq!(split.original, "/complex/stuff/test.other.json");
    assert_eq!(split.base, "/complex/stuff/test.other");
    assert_eq!(split.extension.as_deref(), Some("json"));

    let split = find_extension("test.");
    assert_eq!(split.original, "test.");
    assert_eq!(split.base, "test");
    assert_eq!(split.extension, None);
}

#[test]
fn test_parse_prefix_only() {
    let result = parse_template("/prefixOnly", default_preprocessed_templates())
        .unwrap()
        .unwrap();
    assert_eq!(result.template_key, TemplateKey::List);
    assert_eq!(result.prefix(), Some("prefixOnly"));
    assert_eq!(result.id(), None);
}

#[test]
fn test_parse_prefix_and_id() {
    let result = parse_template("/myPrefix/myId", default_preprocessed_templates())
        .unwrap()
        .unwrap();
    assert_eq!(result.template_key, TemplateKey::Show);
    assert_eq!(result.prefix(), Some("myPrefix"));
    assert_eq!(result.id(), Some("myId"));
}

#[test]
fn test_parse_strips_extension_from_id() {
    let result = parse_template("/myPrefix/myId.xml", default_preprocessed_templates())
        .unwrap()
        .unwrap();
    assert_eq!(result.id(), Some("myId"));
    assert_eq!(result.extension.as_deref(), Some("xml"));
}

#[test]
fn test_parse_discards_trailing_segments() {
    let result = parse_template("/myPrefix/myId/blahblah/yadda.xml", default_preprocessed_templates())
        .unwrap()
        .unwrap();
    assert_eq!(result.template_key, TemplateKey::Show);
    assert_eq!(result.id(), Some("myId"));
}

#[test]
fn test_parse_without_leading_slash() {
    let result = parse_template("myPrefix/stuff/stuff", default_preprocessed_templates()).unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_parse_rejects_invalid_characters() {
    let result = parse_template("/myPrefix/&%$?{}", default_preprocessed_templates());
    assert!(matches!(result, Err(TemplateError::InvalidCharacters { .. })));
}

#[test]
fn test_custom_templates_win_over_defaults() {
    let templates = preprocess_templates(&[
        Template::new(TemplateKey::Show, "/{prefix}/{siteId}/page/{id}"),
    ])
    .unwrap();

    let result = parse_template("/wiki/main/page/home", &templates).unwrap().unwrap();
    assert_eq!(result.template_key, TemplateKey::Show);
    assert_eq!(result.segment_values["siteId"], "main");
    assert_eq!(result.id(), Some("home"));

    // defaults are still there for the keys that were not customised
    let result = parse_template("/wiki/home/edit", &templates).unwrap().unwrap();
    assert_eq!(result.template_key, TemplateKey::Edit);
}

#[test]
fn test_merge_template() {
    let merged = merge_template("/{prefix}/{id}", &values(&[("prefix", "myPrefix"), ("id", "myId")]));
    assert_eq!(merged.unwrap(), "/myPrefix/myId");

    assert!(matches!(
        merge_template("/{prefix}/{id}", &values(&[("prefix", "myPrefix")])),
        Err(TemplateError::MissingSegmentValue { .. })
    ));
    assert_eq!(
        merge_template("", &values(&[("prefix", "myPrefix")])),
        Err(TemplateError::EmptyTemplate)
    );
    assert!(matches!(
        merge_template("/{prefix}/{id}", &HashMap::new()),
        Err(TemplateError::MissingSegmentValue { .. })
    ));
}

#[test]
fn test_merge_inverts_match() {
    for path in ["/site", "/site/abc", "/site/new", "/site/abc/edit", "/site/abc/delete"] {
        let result = parse_template(path, default_preprocessed_templates())
            .unwrap()
            .unwrap();
        let merged = merge_template(&result.template, &result.segment_values).unwrap();
        assert_eq!(merged, path);
    }
}

#[test]
fn test_validator_rejections() {
    let kind = |template: &str| validate_template(template).unwrap_err().kind;

    assert_eq!(kind(""), SyntaxErrorKind::Empty);
    assert_eq!(kind("{prefix}/{id}"), SyntaxErrorKind::MissingLeadingSlash);
    assert_eq!(kind("/{prefix}/{id}/"), SyntaxErrorKind::TrailingSlash);
    assert_eq!(kind("/{prefix}{id}"), SyntaxErrorKind::AdjacentVariablesNoSeparator);
    assert_eq!(kind("/{}/x"), SyntaxErrorKind::EmptyVariableName);
    assert_eq!(kind("/{prefix}/%"), SyntaxErrorKind::InvalidCharacter);
    assert!(validate_template("/{ prefix }/{id}").is_err());
    assert!(validate_template("/{prefix}/{id").is_err());
}
