pub mod input;
pub mod output;

pub use input::{list_candidates, normalize_input_name, resolve_input};
pub use output::{
    normalize_output_name, read_query_hint, sanitize_name, suggest_output_name, HintError,
};
