//! Dashboard overview
//!
//! Per-kind record counts for the admin landing page.

use crate::error::Result;
use crate::services::Entities;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub students: usize,
    pub institutions: usize,
    pub resources: usize,
    pub blogs: usize,
    pub partners: usize,
}

#[derive(Clone)]
pub struct DashboardService {
    entities: Entities,
}

impl DashboardService {
    pub fn new(entities: Entities) -> Self {
        Self { entities }
    }

    /// Fetch all five collections concurrently and count them.
    ///
    /// Fails if any single fetch fails.
    pub async fn fetch_stats(&self) -> Result<DashboardStats> {
        let (students, institutions, resources, blogs, partners) = tokio::try_join!(
            self.entities.students.get_all(),
            self.entities.institutions.get_all(),
            self.entities.resources.get_all(),
            self.entities.blogs.get_all(),
            self.entities.partners.get_all(),
        )
        .map_err(|e| {
            tracing::error!("Error fetching stats: {}", e);
            e
        })?;

        Ok(DashboardStats {
            students: students.len(),
            institutions: institutions.len(),
            resources: resources.len(),
            blogs: blogs.len(),
            partners: partners.len(),
        })
    }
}
