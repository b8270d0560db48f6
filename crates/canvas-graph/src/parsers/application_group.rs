//! Domain, application and module structure.

use crate::builder::GraphBuilder;
use canvas_core::{ApplicationGroupEntry, Result};
use std::collections::HashSet;

/// Places every (application, module) pair under its domain and, when
/// given, its sublayer.
///
/// A pair listed twice belongs to one domain only; the first row wins and
/// later rows are skipped.
pub fn parse_application_groups(
    builder: &mut GraphBuilder,
    entries: &[ApplicationGroupEntry],
) -> Result<()> {
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for entry in entries {
        if !seen.insert((entry.application.as_str(), entry.module.as_str())) {
            skipped += 1;
            continue;
        }

        let domain_id = match entry.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => Some(builder.get_or_create_domain(domain)?),
            None => None,
        };

        builder.get_application_and_module(
            &entry.application,
            &entry.module,
            domain_id.as_deref(),
            entry.layer.as_deref(),
        )?;
    }

    if skipped > 0 {
        builder.logger().warn(&format!(
            "Skipped {} duplicate application group rows",
            skipped
        ));
    }
    Ok(())
}
