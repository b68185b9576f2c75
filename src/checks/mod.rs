//! Reference detectors.
//!
//! Each rule is a small [`Detector`] created fresh for every unit. The rules
//! here are the ones the framework filter knows how to silence, plus two that
//! exercise method matchers.

mod at_least_one_constructor;
mod bad_method_name;
mod method_only_calls_super;
mod optional_as_parameter;
mod servlet_instance_field;
mod session_attributes;
mod string_builder_is_empty;
mod too_many_parameters;

pub use at_least_one_constructor::AtLeastOneConstructor;
pub use bad_method_name::BadMethodName;
pub use method_only_calls_super::MethodOnlyCallsSuper;
pub use optional_as_parameter::OptionalAsParameter;
pub use servlet_instance_field::ServletInstanceField;
pub use session_attributes::ControllerWithSessionAttributes;
pub use string_builder_is_empty::StringBuilderIsEmpty;
pub use too_many_parameters::TooManyParameters;

use regex::Regex;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::detect::{DetectorRegistry, RuleKey};
use crate::filters::has_unknown_annotation_named;
use crate::semantic::SemanticContext;
use crate::tree::Node;

pub const BAD_METHOD_NAME: RuleKey = RuleKey::new("S100");
pub const TOO_MANY_PARAMETERS: RuleKey = RuleKey::new("S107");
pub const METHOD_ONLY_CALLS_SUPER: RuleKey = RuleKey::new("S1185");
pub const AT_LEAST_ONE_CONSTRUCTOR: RuleKey = RuleKey::new("S1258");
pub const SERVLET_INSTANCE_FIELD: RuleKey = RuleKey::new("S2226");
pub const OPTIONAL_AS_PARAMETER: RuleKey = RuleKey::new("S3553");
pub const CONTROLLER_WITH_SESSION_ATTRIBUTES: RuleKey = RuleKey::new("S3753");
pub const STRING_BUILDER_IS_EMPTY: RuleKey = RuleKey::new("S7158");

/// Every rule this crate ships, in registration order.
pub const ALL_RULES: &[RuleKey] = &[
    BAD_METHOD_NAME,
    TOO_MANY_PARAMETERS,
    METHOD_ONLY_CALLS_SUPER,
    AT_LEAST_ONE_CONSTRUCTOR,
    SERVLET_INSTANCE_FIELD,
    OPTIONAL_AS_PARAMETER,
    CONTROLLER_WITH_SESSION_ATTRIBUTES,
    STRING_BUILDER_IS_EMPTY,
];

const OVERRIDE_ANNOTATION: &str = "java.lang.Override";

/// Factories for every rule the configuration enables.
pub fn default_registry(config: &AnalysisConfig) -> anyhow::Result<DetectorRegistry> {
    let max_parameters = config.rules.too_many_parameters.max();
    let format = config.rules.bad_method_name.format().to_string();
    let method_name = Regex::new(&format)
        .map_err(|e| anyhow::anyhow!("invalid bad_method_name format {:?}: {}", format, e))?;

    let mut registry = DetectorRegistry::new();
    registry.register(BAD_METHOD_NAME, move || {
        Box::new(BadMethodName::new(method_name.clone()))
    });
    registry.register(TOO_MANY_PARAMETERS, move || {
        Box::new(TooManyParameters::new(max_parameters))
    });
    registry.register(METHOD_ONLY_CALLS_SUPER, || Box::new(MethodOnlyCallsSuper));
    registry.register(AT_LEAST_ONE_CONSTRUCTOR, || Box::new(AtLeastOneConstructor));
    registry.register(SERVLET_INSTANCE_FIELD, || Box::new(ServletInstanceField));
    registry.register(OPTIONAL_AS_PARAMETER, || Box::new(OptionalAsParameter));
    registry.register(CONTROLLER_WITH_SESSION_ATTRIBUTES, || {
        Box::new(ControllerWithSessionAttributes::new())
    });
    registry.register(STRING_BUILDER_IS_EMPTY, || Box::new(StringBuilderIsEmpty::new()));

    let disabled: Vec<RuleKey> = ALL_RULES
        .iter()
        .copied()
        .filter(|key| !config.is_rule_enabled(key.as_str()))
        .collect();
    for key in &disabled {
        registry.remove(*key);
    }
    debug!(rules = registry.len(), disabled = disabled.len(), "detector registry built");
    Ok(registry)
}

/// `@Override` on a method declaration, bound or written as an unresolved
/// name.
fn is_override(node: Node<'_>, ctx: &SemanticContext) -> bool {
    node.binding()
        .is_some_and(|b| ctx.method_symbol(b).metadata().is_annotated_with(OVERRIDE_ANNOTATION))
        || has_unknown_annotation_named(node, ctx, "Override")
}
