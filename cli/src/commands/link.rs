//! Link command

use anyhow::Result;
use bountyhub_core::{detect_family, extract_token_address};

use crate::output::{LinkResult, OutputFormat};

pub fn handle(input: &str, format: OutputFormat) -> Result<()> {
    let result = LinkResult {
        input: input.to_string(),
        token_address: extract_token_address(input),
        family: detect_family(input),
    };
    format.print(&result)
}
