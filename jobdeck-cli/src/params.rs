//! `key=value` parameter arguments

use anyhow::{Result, bail};
use jobdeck_core::domain::job::Parameters;

/// Parse a single `key=value` argument
///
/// The value may be empty and may itself contain `=`.
pub fn parse_param(arg: &str) -> Result<(String, String)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("Invalid parameter '{}', expected key=value", arg);
    };

    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid parameter '{}', key is empty", arg);
    }

    Ok((key.to_string(), value.to_string()))
}

/// Parse repeated `-p key=value` arguments, later keys win
pub fn parse_params(args: &[String]) -> Result<Parameters> {
    let mut parameters = Parameters::new();
    for arg in args {
        let (key, value) = parse_param(arg)?;
        parameters.insert(key, value);
    }
    Ok(parameters)
}
