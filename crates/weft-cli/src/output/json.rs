use serde::Serialize;
use weft_core::error::WeftError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), WeftError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
