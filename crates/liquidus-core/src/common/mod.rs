pub mod config;
pub mod normalize;

pub use config::AnalysisConfig;
pub use normalize::{
    clean_phase_label, format_fixed3, format_fixed4, parse_number, parse_optional_number,
    subscript_formula_digits,
};
