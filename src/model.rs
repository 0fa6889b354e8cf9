use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed subject set every record is scored against. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    Art,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::History,
        Subject::Art,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Art => "Art",
        }
    }

    pub fn parse(s: &str) -> Option<Subject> {
        Subject::ALL
            .into_iter()
            .find(|sub| sub.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Subject -> score map that always carries exactly the five fixed keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubjectScores(BTreeMap<Subject, i64>);

impl Default for SubjectScores {
    fn default() -> Self {
        SubjectScores(Subject::ALL.into_iter().map(|s| (s, 0)).collect())
    }
}

impl SubjectScores {
    pub fn get(&self, subject: Subject) -> i64 {
        self.0.get(&subject).copied().unwrap_or(0)
    }

    pub fn set(&mut self, subject: Subject, score: i64) {
        self.0.insert(subject, score);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, i64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(Subject, i64)> for SubjectScores {
    fn from_iter<T: IntoIterator<Item = (Subject, i64)>>(iter: T) -> Self {
        let mut out = SubjectScores::default();
        for (subject, score) in iter {
            out.set(subject, score);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub title: String,
    pub date: String,
    pub score: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceMark {
    Present,
    Absent,
}

impl AttendanceMark {
    pub fn parse(s: &str) -> Option<AttendanceMark> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" | "p" => Some(AttendanceMark::Present),
            "absent" | "a" => Some(AttendanceMark::Absent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "class")]
    pub class_tag: String,
    #[serde(rename = "enrolled")]
    pub enrollment_date: String,
    #[serde(rename = "attendance")]
    pub attendance_ratio: i64,
    pub assessments: Vec<Assessment>,
    pub subject_scores: SubjectScores,
    pub total_days: u32,
    pub present_days: u32,
    /// Today's selection, not yet folded into the counters. Never persisted.
    #[serde(skip)]
    pub today_mark: Option<AttendanceMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub classes: Vec<String>,
}
