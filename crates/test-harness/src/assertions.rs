//! Assertion helpers with diagnostic output.
//!
//! Every failure names the context, the expected value and the actual one.

use grid_types::BoundingBox;
use part_engine::Rendered;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

fn failed(ctx: &str, detail: impl std::fmt::Display) -> HarnessError {
    HarnessError::AssertionFailed {
        detail: format!("[{}] {}", ctx, detail),
    }
}

/// Assert the bounding box size within `tol` on every axis.
pub fn assert_envelope(
    bbox: &BoundingBox,
    expected: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let size = bbox.size();
    for i in 0..3 {
        if (size[i] - expected[i]).abs() > tol {
            return Err(failed(
                ctx,
                format!(
                    "size[{}]: expected {:.3}, got {:.3} (tol={})",
                    i, expected[i], size[i], tol
                ),
            ));
        }
    }
    Ok(())
}

/// Assert a cosmetic operation with this label was skipped.
pub fn assert_skipped(rendered: &Rendered, label: &str, ctx: &str) -> Result<(), HarnessError> {
    if rendered.skipped.iter().any(|l| l == label) {
        Ok(())
    } else {
        Err(failed(
            ctx,
            format!("'{}' not skipped; skipped: {:?}", label, rendered.skipped),
        ))
    }
}

/// Assert nothing but the listed cosmetic operations was skipped.
pub fn assert_only_skipped(
    rendered: &Rendered,
    allowed: &[&str],
    ctx: &str,
) -> Result<(), HarnessError> {
    let extra: Vec<&String> = rendered
        .skipped
        .iter()
        .filter(|l| !allowed.contains(&l.as_str()))
        .collect();
    if extra.is_empty() {
        Ok(())
    } else {
        Err(failed(ctx, format!("unexpected skips: {:?}", extra)))
    }
}

/// Assert every verdict passed, listing all failures at once.
pub fn assert_verdicts(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failures: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("{}: {}", v.oracle_name, v.detail))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: ctx.to_string(),
            detail: failures.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_reports_axis() {
        let bb = BoundingBox::new([0.0; 3], [10.0, 20.0, 5.0]);
        assert!(assert_envelope(&bb, [10.0, 20.0, 5.0], 1e-9, "ok").is_ok());
        let err = assert_envelope(&bb, [10.0, 21.0, 5.0], 1e-3, "box").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("[box]"));
        assert!(msg.contains("size[1]"));
    }
}
