//! Checksum identity tests for component descriptors
//!
//! Covers determinism, sensitivity to every field and rule ordering, and
//! independence from how the descriptor was built.

use stencil_core::*;

fn input_rule() -> BindingRule {
    BindingRule::tag("input")
        .require(RequiredRule::named("type").with_value("checkbox", ValueComparison::FullMatch))
        .require(RequiredRule::prefixed("data-"))
}

fn checkbox_builder() -> DescriptorBuilder {
    ComponentDescriptor::builder(
        DescriptorKind::TagHelper {
            type_name: "Web.CheckboxTagHelper".to_string(),
        },
        "CheckboxTagHelper",
        "Web.TagHelpers",
    )
    .rule(input_rule())
    .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
    .metadata("Common.TypeName", "Web.CheckboxTagHelper")
}

fn checkbox() -> ComponentDescriptor {
    checkbox_builder().build().unwrap()
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_checksum_is_stable_for_same_value() {
    let descriptor = checkbox();
    assert_eq!(Checksum::of(&descriptor), descriptor.checksum());
    assert_eq!(descriptor.checksum(), descriptor.clone().checksum());
}

#[test]
fn test_independently_built_descriptors_are_equal() {
    let a = checkbox();
    let b = checkbox();
    assert_eq!(a.checksum(), b.checksum());
    assert_eq!(a, b);
}

#[test]
fn test_pooled_and_fresh_descriptors_share_identity() {
    let pool = BuilderPool::new();
    let pooled = pool
        .acquire(
            DescriptorKind::TagHelper {
                type_name: "Web.CheckboxTagHelper".to_string(),
            },
            "CheckboxTagHelper",
            "Web.TagHelpers",
        )
        .rule(input_rule())
        .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
        .metadata("Common.TypeName", "Web.CheckboxTagHelper");
    let pooled = pool.freeze(pooled).unwrap();
    assert_eq!(pooled.checksum(), checkbox().checksum());
}

// =============================================================================
// Sensitivity
// =============================================================================

#[test]
fn test_reordering_required_rules_changes_checksum() {
    let reordered = ComponentDescriptor::builder(
        DescriptorKind::TagHelper {
            type_name: "Web.CheckboxTagHelper".to_string(),
        },
        "CheckboxTagHelper",
        "Web.TagHelpers",
    )
    .rule(
        BindingRule::tag("input")
            .require(RequiredRule::prefixed("data-"))
            .require(
                RequiredRule::named("type").with_value("checkbox", ValueComparison::FullMatch),
            ),
    )
    .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
    .metadata("Common.TypeName", "Web.CheckboxTagHelper")
    .build()
    .unwrap();

    assert_ne!(reordered.checksum(), checkbox().checksum());
}

#[test]
fn test_every_field_contributes() {
    let base = checkbox().checksum();

    let variants: Vec<ComponentDescriptor> = vec![
        // name
        ComponentDescriptor::builder(
            DescriptorKind::TagHelper {
                type_name: "Web.CheckboxTagHelper".to_string(),
            },
            "CheckboxTagHelper2",
            "Web.TagHelpers",
        )
        .rule(input_rule())
        .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
        .metadata("Common.TypeName", "Web.CheckboxTagHelper")
        .build()
        .unwrap(),
        // assembly
        ComponentDescriptor::builder(
            DescriptorKind::TagHelper {
                type_name: "Web.CheckboxTagHelper".to_string(),
            },
            "CheckboxTagHelper",
            "Other.Assembly",
        )
        .rule(input_rule())
        .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
        .metadata("Common.TypeName", "Web.CheckboxTagHelper")
        .build()
        .unwrap(),
        // variant field
        ComponentDescriptor::builder(
            DescriptorKind::TagHelper {
                type_name: "Web.Other".to_string(),
            },
            "CheckboxTagHelper",
            "Web.TagHelpers",
        )
        .rule(input_rule())
        .bound_attribute(BoundAttribute::new("asp-for", "For", "ModelExpression"))
        .metadata("Common.TypeName", "Web.CheckboxTagHelper")
        .build()
        .unwrap(),
        // extra rule
        checkbox_builder().rule(BindingRule::tag("select")).build().unwrap(),
        // bound attribute type
        ComponentDescriptor::builder(
            DescriptorKind::TagHelper {
                type_name: "Web.CheckboxTagHelper".to_string(),
            },
            "CheckboxTagHelper",
            "Web.TagHelpers",
        )
        .rule(input_rule())
        .bound_attribute(BoundAttribute::new("asp-for", "For", "string"))
        .metadata("Common.TypeName", "Web.CheckboxTagHelper")
        .build()
        .unwrap(),
        // metadata
        checkbox_builder().metadata("k", "v").build().unwrap(),
        // flags
        checkbox_builder()
            .flags(DescriptorFlags::CASE_SENSITIVE)
            .build()
            .unwrap(),
    ];

    for (i, variant) in variants.iter().enumerate() {
        assert_ne!(variant.checksum(), base, "variant {} collided", i);
    }
}

#[test]
fn test_required_rule_fields_contribute() {
    let base = Checksum::of(&RequiredRule::named("type"));
    let changed = [
        RequiredRule::named("kind"),
        RequiredRule::prefixed("type"),
        RequiredRule::named("type").with_value("a", ValueComparison::FullMatch),
        RequiredRule::named("type").with_value("a", ValueComparison::SuffixMatch),
        RequiredRule::named("type").case_sensitive(true),
        RequiredRule::directive("type"),
    ];
    for rule in &changed {
        assert_ne!(Checksum::of(rule), base, "{:?}", rule);
    }
}

#[test]
fn test_kind_discriminant_prevents_collisions() {
    // Same single string payload in two different variants.
    let tag_helper = ComponentDescriptor::builder(
        DescriptorKind::TagHelper {
            type_name: "X".to_string(),
        },
        "X",
        "A",
    )
    .rule(BindingRule::tag("x"))
    .build()
    .unwrap();
    let event = ComponentDescriptor::builder(
        DescriptorKind::EventHandler {
            event_args_type: "X".to_string(),
        },
        "X",
        "A",
    )
    .rule(BindingRule::tag("x"))
    .build()
    .unwrap();

    assert_ne!(tag_helper.checksum(), event.checksum());
}

#[test]
fn test_checksum_hex_is_lowercase_fixed_width() {
    let hex = checkbox().checksum().to_hex();
    assert_eq!(hex.len(), 64);
    assert_eq!(hex, hex.to_lowercase());
    assert_eq!(hex.parse::<Checksum>().unwrap(), checkbox().checksum());
}

#[test]
fn test_invalid_required_rule_is_rejected_at_build() {
    let mut required = RequiredRule::named("type");
    required.value_comparison = ValueComparison::PrefixMatch;

    let result = ComponentDescriptor::builder(
        DescriptorKind::TagHelper {
            type_name: "X".to_string(),
        },
        "X",
        "A",
    )
    .rule(BindingRule::tag("input").require(required))
    .build();

    assert!(matches!(result, Err(CoreError::InvalidValue { .. })));
}
