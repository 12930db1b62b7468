//! The plain-text validation trace (`validation-trace.txt`).

use crate::status::InputProvenance;
use crate::validate::ValidationState;

const RULE_WIDTH: usize = 60;

/// Renders the complete trace file content.
pub fn render_validation_trace(
    as_of_utc: &str,
    provenance: &InputProvenance,
    input_sha256: &str,
    messages: &[String],
    state: ValidationState,
) -> String {
    let mut out = String::new();
    out.push_str("Etalon Derived Package - Validation Trace\n");
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\n\n");
    out.push_str(&format!("Timestamp: {as_of_utc}\n"));
    out.push_str(&format!("Input: {}\n", provenance.source_path));
    out.push_str(&format!("Source Repo: {}\n", provenance.source_repo));
    out.push_str(&format!("Source Commit: {}\n", provenance.source_commit));
    out.push_str(&format!("Input SHA-256: {input_sha256}\n\n"));
    out.push_str("Validation Steps:\n");
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    for message in messages {
        out.push_str(message);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("Final State: {state}\n"));
    out.push('\n');
    out.push_str("SCOPE: STRUCTURAL_ONLY\n");
    out.push_str("NO SCIENTIFIC INTERPRETATION PERFORMED\n");
    out.push_str("NO ORBITAL COMPUTATIONS PERFORMED\n");
    out
}
