//! In-memory search over loaded records
//!
//! Admin screens load a whole collection and filter it locally with a
//! case-insensitive substring match over a few fields per kind.

use crate::database::{Blog, Institution, Partner, Record, Resource, Student};

pub trait Searchable {
    /// Field values the search term is matched against
    fn search_fields(&self) -> Vec<&str>;

    /// An empty term matches everything
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Records whose searchable fields contain `term`, in their original order
pub fn filter_records<'a, T: Searchable>(
    records: &'a [Record<T>],
    term: &str,
) -> Vec<&'a Record<T>> {
    records
        .iter()
        .filter(|record| record.fields.matches(term))
        .collect()
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.institution.as_str(),
            self.field_of_study.as_str(),
        ]
    }
}

impl Searchable for Institution {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.kind.as_str(), self.location.as_str()]
    }
}

impl Searchable for Resource {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.category.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

impl Searchable for Blog {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.author.as_str(),
            self.category.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

impl Searchable for Partner {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.kind.as_str(),
            self.partnership_type.as_str(),
            self.contact_person.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{PartnerType, PartnershipType};
    use chrono::Utc;

    fn record<T>(id: &str, fields: T) -> Record<T> {
        let now = Utc::now();
        Record {
            id: id.to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids<'a>(records: &'a [Record<Institution>], term: &str) -> Vec<&'a str> {
        filter_records(records, term)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect()
    }

    #[test]
    fn test_institution_search() {
        let records = vec![
            record(
                "1",
                Institution {
                    name: "State College".to_string(),
                    kind: "college".to_string(),
                    location: "Boston, MA".to_string(),
                    ..Institution::default()
                },
            ),
            record(
                "2",
                Institution {
                    name: "Tech University".to_string(),
                    kind: "university".to_string(),
                    location: "Austin, TX".to_string(),
                    ..Institution::default()
                },
            ),
        ];

        assert_eq!(ids(&records, "boston"), vec!["1"]);
        assert_eq!(ids(&records, "UNIVERSITY"), vec!["2"]);
        assert_eq!(ids(&records, "e"), vec!["1", "2"]);
        assert_eq!(ids(&records, ""), vec!["1", "2"]);
        assert!(ids(&records, "oxford").is_empty());
    }

    #[test]
    fn test_tags_are_searched() {
        let blog = Blog {
            title: "Fall Deadlines".to_string(),
            tags: vec!["FAFSA".to_string(), "grants".to_string()],
            ..Blog::default()
        };
        assert!(blog.matches("fafsa"));
        assert!(!blog.matches("loans"));

        let resource = Resource {
            title: "Essay Guide".to_string(),
            tags: vec!["writing".to_string()],
            ..Resource::default()
        };
        assert!(resource.matches("WRIT"));
    }

    #[test]
    fn test_partner_enum_fields_are_searched() {
        let partner = Partner {
            name: "Acme".to_string(),
            kind: PartnerType::Government,
            partnership_type: PartnershipType::Funding,
            contact_person: "Sam Lee".to_string(),
            ..Partner::default()
        };

        assert!(partner.matches("government"));
        assert!(partner.matches("fund"));
        assert!(partner.matches("sam"));
        assert!(!partner.matches("academic"));
    }
}
