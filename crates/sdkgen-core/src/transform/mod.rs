pub mod enum_hoister;
pub mod name_normalizer;
pub mod property_policy;
pub mod response_shape;
pub mod validation_rules;

pub use enum_hoister::{EnumHoister, HoistedEnum};
pub use property_policy::PropertyPolicy;
pub use response_shape::infer_returns;
pub use validation_rules::{
    RuleKind, ValidatedField, ValidationCompiler, ValidationObject, ValidationRule,
};
