use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub professor: String,
    pub department: String,
    pub credits: u8,
    /// Target year level (1-4).
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub schedule: Option<String>,
}

/// Course search criteria.
///
/// Sent to the backend as query parameters and re-applied locally with
/// [`CourseFilter::matches`] when narrowing an already fetched list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub keyword: Option<String>,
    pub department: Option<String>,
    pub grade: Option<u8>,
    pub credits: Option<u8>,
}

impl CourseFilter {
    pub fn is_empty(&self) -> bool {
        self.keyword_lower().is_none()
            && self.department.is_none()
            && self.grade.is_none()
            && self.credits.is_none()
    }

    fn keyword_lower(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
    }

    /// Keyword matches name, code or professor (case-insensitive); the other
    /// criteria must match exactly when set.
    pub fn matches(&self, course: &Course) -> bool {
        if let Some(keyword) = self.keyword_lower() {
            let hit = course.name.to_lowercase().contains(&keyword)
                || course.code.to_lowercase().contains(&keyword)
                || course.professor.to_lowercase().contains(&keyword);
            if !hit {
                return false;
            }
        }
        if let Some(department) = &self.department {
            if &course.department != department {
                return false;
            }
        }
        if self.grade.is_some() && course.grade != self.grade {
            return false;
        }
        if let Some(credits) = self.credits {
            if course.credits != credits {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, courses: Vec<Course>) -> Vec<Course> {
        if self.is_empty() {
            return courses;
        }
        courses.into_iter().filter(|c| self.matches(c)).collect()
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(keyword) = self.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                query.push(("keyword", keyword.to_string()));
            }
        }
        if let Some(department) = &self.department {
            query.push(("department", department.clone()));
        }
        if let Some(grade) = self.grade {
            query.push(("grade", grade.to_string()));
        }
        if let Some(credits) = self.credits {
            query.push(("credits", credits.to_string()));
        }
        query
    }
}
