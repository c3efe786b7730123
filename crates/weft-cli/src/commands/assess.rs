use std::path::Path;
use weft_core::calc::assessment::parse_assessment_json;
use weft_core::error::WeftError;
use weft_core::{assess_with, validate_assessment};

use crate::commands::load_factors;
use crate::output;

pub fn run(
    input_file: &Path,
    factors_file: Option<&Path>,
    output_format: &str,
) -> Result<(), WeftError> {
    let json = std::fs::read_to_string(input_file)?;
    let input = parse_assessment_json(&json)?;
    let factors = load_factors(factors_file)?;

    let findings = validate_assessment(&input);
    let errors = findings.iter().filter(|f| f.is_error()).count();
    if errors > 0 {
        output::table::print_findings(&findings);
        return Err(WeftError::InvalidAssessment(format!(
            "{errors} error(s) in {}",
            input_file.display()
        )));
    }

    let result = assess_with(&input, &factors);

    match output_format {
        "json" => output::json::print(&result)?,
        _ => {
            output::table::print_findings(&findings);
            output::table::print_assessment(&result);
        }
    }

    Ok(())
}
