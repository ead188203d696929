use tracing::{debug, instrument};

use reachly_store::{ContextStore, StoreError};

pub const MEMORY_HEADER: &str = "Relevant past outreach context:";

/// Digest of similar past prospects, or `""` when there are none.
///
/// Only role and company of past prospects are echoed; names and summaries stay out
/// of generation input.
#[instrument(skip(store))]
pub fn build_memory_context(
    store: &dyn ContextStore,
    role: Option<&str>,
    industry: Option<&str>,
    limit: u32,
) -> Result<String, StoreError> {
    let similar = store.find_similar_prospects(industry, role, limit)?;
    if similar.is_empty() {
        return Ok(String::new());
    }
    debug!(matches = similar.len(), "memory context built");

    let mut lines = vec![MEMORY_HEADER.to_string()];
    for prospect in &similar {
        let mut line = String::from("- Previously reached out to");
        if let Some(role) = prospect.role.as_deref() {
            line.push_str(&format!(" a {role}"));
        }
        if let Some(company) = prospect.company.as_deref() {
            line.push_str(&format!(" at {company}"));
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Persona block with the memory context appended when non-empty.
pub fn enrich(persona_block: &str, memory_context: &str) -> String {
    if memory_context.is_empty() {
        persona_block.to_string()
    } else {
        format!("{persona_block}\n\n{memory_context}")
    }
}

#[cfg(test)]
mod tests {
    use reachly_core::{NewProspect, ProspectSource};
    use reachly_store::SqliteStore;

    use super::*;

    fn save(store: &SqliteStore, name: &str, role: Option<&str>, company: Option<&str>, industry: Option<&str>) {
        let np = NewProspect::new("raw", "secret summary", "sty", ProspectSource::RawText)
            .unwrap()
            .with_name(Some(name.into()))
            .with_role(role.map(Into::into))
            .with_company(company.map(Into::into))
            .with_industry(industry.map(Into::into));
        store.save_prospect(&np).unwrap();
    }

    #[test]
    fn empty_when_no_matches() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(build_memory_context(&store, Some("Engineer"), None, 3).unwrap(), "");
    }

    #[test]
    fn empty_when_no_filters() {
        let store = SqliteStore::in_memory().unwrap();
        save(&store, "Ann", Some("Engineer"), Some("Acme"), None);
        assert_eq!(build_memory_context(&store, None, None, 3).unwrap(), "");
    }

    #[test]
    fn one_line_per_match() {
        let store = SqliteStore::in_memory().unwrap();
        save(&store, "Ann Example", Some("Engineer"), Some("Acme"), None);

        let ctx = build_memory_context(&store, Some("Engineer"), None, 3).unwrap();
        assert!(ctx.starts_with(MEMORY_HEADER));
        assert!(ctx.contains("Previously reached out to a Engineer at Acme"));
        assert!(!ctx.contains("Ann Example"));
        assert!(!ctx.contains("secret summary"));
    }

    #[test]
    fn absent_clauses_are_omitted() {
        let store = SqliteStore::in_memory().unwrap();
        save(&store, "A", None, Some("Globex"), Some("Fintech"));
        save(&store, "B", None, None, Some("Fintech"));

        let ctx = build_memory_context(&store, None, Some("Fintech"), 3).unwrap();
        let lines: Vec<_> = ctx.lines().collect();
        assert_eq!(
            lines,
            vec![MEMORY_HEADER, "- Previously reached out to", "- Previously reached out to at Globex"]
        );
    }

    #[test]
    fn enrich_appends_only_non_empty_context() {
        assert_eq!(enrich("persona", ""), "persona");
        assert_eq!(enrich("persona", "ctx"), "persona\n\nctx");
    }
}
