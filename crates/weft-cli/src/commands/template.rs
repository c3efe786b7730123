use std::io::Write;
use std::path::Path;
use weft_core::error::WeftError;
use weft_core::template::{example_rows, header_row, reference_rows, Locale};

const REFERENCE_HEADER: [&str; 5] = ["key", "label", "required", "accepted values", "description"];

pub fn run(locale: &str, reference: bool, out: Option<&Path>) -> Result<(), WeftError> {
    let locale = Locale::from_str_loose(locale).unwrap_or_default();

    let sink: Box<dyn Write> = match out {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    if reference {
        writer.write_record(REFERENCE_HEADER)?;
        for row in reference_rows(locale) {
            writer.write_record(&row)?;
        }
    } else {
        writer.write_record(header_row(locale))?;
        for row in example_rows() {
            writer.write_record(&row)?;
        }
    }
    writer.flush()?;

    if let Some(path) = out {
        eprintln!("Template written to {}", path.display());
    }
    Ok(())
}
