// Projects module - project showcase read path
//
// The showcase lists whatever is in the `projects` collection. If the store
// cannot be read, the site still renders: a fixed set of sample projects is
// served instead and the response says so.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project card as rendered by the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Empty on import; the store assigns one
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default = "default_link")]
    pub github: String,
    #[serde(default = "default_link")]
    pub live: String,
    /// Tailwind gradient classes for the card accent bar
    #[serde(default = "default_gradient")]
    pub gradient: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_link() -> String {
    "#".to_string()
}

fn default_gradient() -> String {
    "from-purple-500 to-pink-500".to_string()
}

/// Read side of the document store used by the showcase
pub trait ProjectSource: Send + Sync {
    fn list_projects(&self) -> anyhow::Result<Vec<Project>>;
}

/// Where a feed's projects came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Database,
    Fallback,
}

/// Projects ready to render
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFeed {
    pub source: FeedSource,
    pub count: usize,
    pub projects: Vec<Project>,
}

impl ProjectFeed {
    /// Load projects, falling back to the built-in samples on store failure
    ///
    /// An empty collection is not a failure and is returned as-is.
    pub fn load(source: &dyn ProjectSource) -> Self {
        match source.list_projects() {
            Ok(projects) => {
                tracing::debug!("Projects loaded: {}", projects.len());
                Self::new(FeedSource::Database, projects)
            }
            Err(e) => {
                tracing::error!("Error loading projects, serving samples: {:#}", e);
                Self::new(FeedSource::Fallback, fallback_projects())
            }
        }
    }

    fn new(source: FeedSource, projects: Vec<Project>) -> Self {
        Self {
            source,
            count: projects.len(),
            projects,
        }
    }
}

/// Sample projects shown when the store is unreachable
pub fn fallback_projects() -> Vec<Project> {
    let now = Utc::now();
    let sample = |id: &str, title: &str, description: &str, tech: &[&str], gradient: &str| {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            tech: tech.iter().map(|t| t.to_string()).collect(),
            github: default_link(),
            live: default_link(),
            gradient: gradient.to_string(),
            created_at: now,
        }
    };

    vec![
        sample(
            "1",
            "My Portfolio Website",
            "A responsive personal portfolio built with React, Tailwind CSS, and Firebase for hosting and contact form functionality.",
            &["React", "TypeScript", "Tailwind CSS", "Firebase"],
            "from-purple-500 to-pink-500",
        ),
        sample(
            "2",
            "Task Management App",
            "Real-time task management system with drag-and-drop functionality and team collaboration features.",
            &["React", "Firebase", "Tailwind CSS"],
            "from-blue-500 to-cyan-500",
        ),
        sample(
            "3",
            "Weather Dashboard",
            "Interactive weather application with location-based forecasts and historical data visualization.",
            &["JavaScript", "API Integration", "Chart.js"],
            "from-orange-500 to-yellow-500",
        ),
    ]
}
