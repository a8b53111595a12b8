//! Validation rule extraction.
//!
//! Two declaration styles produce the same [`ValidationRule`] records:
//!
//! - fluent validator chains (`RuleFor(x => x.Email).NotEmpty().EmailAddress()`),
//!   read by [`extract_chain_rules`] from a flattened [`ChainCall`] list
//! - data annotations on properties (`[Required]`, `[StringLength(100)]`),
//!   read by [`rules_from_annotations`]
//!
//! [`fold_rules`] then collapses the fine-grained records into one
//! [`PropertyValidationRules`] per property, keeping whatever does not fit
//! that shape as extra rules.
//!
//! Nothing here fails: an argument that cannot be read as a literal simply
//! produces no rule.
//!
//! [`ChainCall`]: clientgen_ir::ChainCall
//! [`PropertyValidationRules`]: clientgen_ir::PropertyValidationRules
//! [`ValidationRule`]: clientgen_ir::ValidationRule

mod annotations;
mod fluent;
mod fold;

pub use annotations::rules_from_annotations;
pub use fluent::{extract_chain_rules, extract_property_rules, selected_property};
pub use fold::fold_rules;
