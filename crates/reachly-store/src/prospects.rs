use rusqlite::{params, Row};
use tracing::{debug, instrument};

use reachly_core::{NewProspect, Prospect, ProspectId, ProspectSummary};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, get, get_opt, parse_enum};
use crate::schema::PROSPECT_COLUMNS;

const TABLE: &str = "prospects";

pub struct ProspectRepo {
    db: Database,
}

impl ProspectRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new prospect. The id and creation time are assigned here.
    #[instrument(skip(self, prospect), fields(source = %prospect.source()))]
    pub fn save(&self, prospect: &NewProspect) -> Result<ProspectId, StoreError> {
        let id = ProspectId::new();
        let now = row_helpers::now_timestamp();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO prospects (id, name, role, company, industry, seniority, summary, style, raw_profile, source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id.as_str(),
                    prospect.name,
                    prospect.role,
                    prospect.company,
                    prospect.industry,
                    prospect.seniority,
                    prospect.summary(),
                    prospect.style(),
                    prospect.raw_profile(),
                    prospect.source().to_string(),
                    now,
                ],
            )?;
            Ok(())
        })?;
        debug!(prospect_id = %id, "prospect saved");
        Ok(id)
    }

    /// Every prospect, newest first. Persona text and raw profile are not loaded.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<ProspectSummary>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, role, company, industry, created_at FROM prospects
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(ProspectSummary {
                    id: ProspectId::from_raw(get::<String>(row, 0, TABLE, "id")?),
                    name: get_opt(row, 1, TABLE, "name")?,
                    role: get_opt(row, 2, TABLE, "role")?,
                    company: get_opt(row, 3, TABLE, "company")?,
                    industry: get_opt(row, 4, TABLE, "industry")?,
                    created_at: get(row, 5, TABLE, "created_at")?,
                });
            }
            Ok(out)
        })
    }

    /// Full record, or `None` when no row has this id.
    #[instrument(skip(self), fields(prospect_id = %id))]
    pub fn get(&self, id: &ProspectId) -> Result<Option<Prospect>, StoreError> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => Ok(Some(prospect_from_row(row)?)),
                None => Ok(None),
            }
        })
    }

    /// Prospects whose industry **or** role equals the given value, newest first.
    ///
    /// Blank filters count as absent; with no filter at all nothing is queried and the
    /// result is empty.
    #[instrument(skip(self))]
    pub fn find_similar(
        &self,
        industry: Option<&str>,
        role: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Prospect>, StoreError> {
        let industry = industry.map(str::trim).filter(|s| !s.is_empty());
        let role = role.map(str::trim).filter(|s| !s.is_empty());

        let mut clauses = Vec::new();
        let mut values: Vec<&str> = Vec::new();
        if let Some(industry) = industry {
            values.push(industry);
            clauses.push(format!("industry = ?{}", values.len()));
        }
        if let Some(role) = role {
            values.push(role);
            clauses.push(format!("role = ?{}", values.len()));
        }
        if clauses.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {PROSPECT_COLUMNS} FROM prospects WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            clauses.join(" OR ")
        );
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(prospect_from_row(row)?);
            }
            debug!(matches = out.len(), "similar prospects");
            Ok(out)
        })
    }
}

fn prospect_from_row(row: &Row<'_>) -> Result<Prospect, StoreError> {
    let source: String = get(row, 9, TABLE, "source")?;
    Ok(Prospect {
        id: ProspectId::from_raw(get::<String>(row, 0, TABLE, "id")?),
        name: get_opt(row, 1, TABLE, "name")?,
        role: get_opt(row, 2, TABLE, "role")?,
        company: get_opt(row, 3, TABLE, "company")?,
        industry: get_opt(row, 4, TABLE, "industry")?,
        seniority: get_opt(row, 5, TABLE, "seniority")?,
        summary: get(row, 6, TABLE, "summary")?,
        style: get(row, 7, TABLE, "style")?,
        raw_profile: get(row, 8, TABLE, "raw_profile")?,
        source: parse_enum(&source, TABLE, "source")?,
        created_at: get(row, 10, TABLE, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use reachly_core::ProspectSource;

    use super::*;

    fn repo() -> ProspectRepo {
        ProspectRepo::new(Database::in_memory().unwrap())
    }

    fn new_prospect(role: Option<&str>, industry: Option<&str>) -> NewProspect {
        NewProspect::new("raw profile text", "- summary", "- style", ProspectSource::RawText)
            .unwrap()
            .with_role(role.map(Into::into))
            .with_industry(industry.map(Into::into))
    }

    #[test]
    fn save_and_get_roundtrip() {
        let repo = repo();
        let np = NewProspect::new("  raw\n text ", "sum", "sty", ProspectSource::Linkedin)
            .unwrap()
            .with_name(Some("Jalaja Utekar".into()))
            .with_company(Some("Eqanim Tech Pvt Ltd".into()));
        let id = repo.save(&np).unwrap();

        let p = repo.get(&id).unwrap().unwrap();
        assert_eq!(p.id, id);
        assert_eq!(p.name.as_deref(), Some("Jalaja Utekar"));
        assert_eq!(p.company.as_deref(), Some("Eqanim Tech Pvt Ltd"));
        assert!(p.role.is_none());
        assert_eq!(p.raw_profile, "  raw\n text ");
        assert_eq!(p.source, ProspectSource::Linkedin);
        assert!(!p.created_at.is_empty());
    }

    #[test]
    fn ids_are_distinct() {
        let repo = repo();
        let a = repo.save(&new_prospect(None, None)).unwrap();
        let b = repo.save(&new_prospect(None, None)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn get_missing_is_none() {
        assert!(repo().get(&ProspectId::from_raw("prs_nope")).unwrap().is_none());
    }

    #[test]
    fn list_newest_first() {
        let repo = repo();
        let first = repo.save(&new_prospect(Some("A"), None)).unwrap();
        let second = repo.save(&new_prospect(Some("B"), None)).unwrap();
        let third = repo.save(&new_prospect(Some("C"), None)).unwrap();

        let ids: Vec<_> = repo.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn find_similar_without_filters_is_empty() {
        let repo = repo();
        repo.save(&new_prospect(Some("Engineer"), Some("SaaS"))).unwrap();
        assert!(repo.find_similar(None, None, 3).unwrap().is_empty());
        assert!(repo.find_similar(Some(" "), Some(""), 3).unwrap().is_empty());
    }

    #[test]
    fn find_similar_uses_or_semantics() {
        let repo = repo();
        let by_industry = repo.save(&new_prospect(Some("Designer"), Some("SaaS"))).unwrap();
        let by_role = repo.save(&new_prospect(Some("Engineer"), Some("Retail"))).unwrap();
        repo.save(&new_prospect(Some("Chef"), Some("Food"))).unwrap();

        let found: Vec<_> = repo
            .find_similar(Some("SaaS"), Some("Engineer"), 10)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(found, vec![by_role, by_industry]);
    }

    #[test]
    fn find_similar_exact_match_only() {
        let repo = repo();
        repo.save(&new_prospect(Some("Senior Engineer"), None)).unwrap();
        assert!(repo.find_similar(None, Some("Engineer"), 3).unwrap().is_empty());
    }

    #[test]
    fn find_similar_respects_limit_newest_first() {
        let repo = repo();
        let ids: Vec<_> = (0..5)
            .map(|_| repo.save(&new_prospect(Some("Engineer"), None)).unwrap())
            .collect();

        let found: Vec<_> = repo
            .find_similar(None, Some("Engineer"), 3)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(found, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
    }

    #[test]
    fn corrupt_source_surfaces() {
        let repo = repo();
        let id = repo.save(&new_prospect(None, None)).unwrap();
        repo.db
            .with_conn(|conn| {
                conn.execute("UPDATE prospects SET source = 'carrier_pigeon'", [])?;
                Ok(())
            })
            .unwrap();
        assert!(matches!(
            repo.get(&id),
            Err(StoreError::CorruptRow { column: "source", .. })
        ));
    }
}
