//! Validating Spanish identifiers.
//!
//! Runs the NIF, CIF and social security number validators over a mixed
//! batch of inputs and prints a verdict for each.

use cadencia::{validate_cif, validate_nif, validate_ss_number, ValidationError};

fn report(kind: &str, id: &str, result: Result<(), ValidationError>) {
    match result {
        Ok(()) => println!("  {kind}  {id:<14} ok"),
        Err(err) => println!("  {kind}  {id:<14} rejected: {err}"),
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    println!("=== Spanish Identifier Validation Example ===\n");

    println!("NIF (8 digits + mod-23 control letter):");
    for id in ["12345678Z", "00000000T", "12345678A", "1234567Z", "ABCDEFGHZ"] {
        report("NIF", id, validate_nif(id));
    }

    println!("\nCIF (letter + 7 digits + checksum digit):");
    for id in ["B12345674", "A58818501", "B00000000", "B12345670", "812345674"] {
        report("CIF", id, validate_cif(id));
    }

    println!("\nSocial security number (12+ digits):");
    for id in ["281234567840", "0811234567895", "28123456", "2812345678AB"] {
        report("SS ", id, validate_ss_number(id));
    }

    println!("\n=== Example Complete ===");
}
