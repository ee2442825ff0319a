use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::{require, require_some, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub category: String,
    pub proficiency: Option<Proficiency>,
}

impl Resource for Skill {
    const COLLECTION: &'static str = "skills";
    const NAME: &'static str = "Skill";
    const CHECK_DUPLICATES: bool = true;

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require(&self.category, "category")
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub graduation_date: Option<NaiveDate>,
    pub current: bool,
    pub gpa: Option<f64>,
    pub honors: Option<String>,
}

impl Resource for Education {
    const COLLECTION: &'static str = "education";
    const NAME: &'static str = "Education";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.institution, "institution")?;
        require(&self.degree, "degree")?;
        if let Some(gpa) = self.gpa {
            if !(0.0..=5.0).contains(&gpa) {
                return Err(AppError::Validation(
                    "gpa must be between 0 and 5".to_string(),
                ));
            }
        }
        ensure_ordered(self.start_date, self.graduation_date, "graduationDate")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Employment {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl Resource for Employment {
    const COLLECTION: &'static str = "employment";
    const NAME: &'static str = "Employment";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.title, "title")?;
        require(&self.company, "company")?;
        require_some(&self.start_date, "startDate")?;
        ensure_ordered(self.start_date, self.end_date, "endDate")
    }

    /// A current position has no end date.
    fn prepare_create(mut self) -> Self {
        if self.current {
            self.end_date = None;
        }
        self
    }

    fn prepare_update(self, _existing: &Self) -> Self {
        self.prepare_create()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub organization: String,
    pub date_earned: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub does_not_expire: bool,
    pub certification_id: Option<String>,
    pub category: Option<String>,
}

impl Resource for Certification {
    const COLLECTION: &'static str = "certifications";
    const NAME: &'static str = "Certification";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require(&self.organization, "organization")?;
        ensure_ordered(self.date_earned, self.expiration_date, "expirationDate")
    }

    fn prepare_create(mut self) -> Self {
        if self.does_not_expire {
            self.expiration_date = None;
        }
        self
    }

    fn prepare_update(self, _existing: &Self) -> Self {
        self.prepare_create()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    pub role: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub status: Option<String>,
}

impl Resource for Project {
    const COLLECTION: &'static str = "projects";
    const NAME: &'static str = "Project";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require(&self.description, "description")?;
        ensure_ordered(self.start_date, self.end_date, "endDate")
    }
}

/// Free-form roster entry served under `/api/record`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    pub position: String,
    pub level: String,
}

impl Resource for Record {
    const COLLECTION: &'static str = "records";
    const NAME: &'static str = "Record";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require(&self.position, "position")?;
        require(&self.level, "level")
    }
}

fn ensure_ordered(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    end_field: &str,
) -> Result<(), AppError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(AppError::Validation(format!(
            "{end_field} cannot be before the start date"
        ))),
        _ => Ok(()),
    }
}
