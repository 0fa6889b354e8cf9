use crate::model::{Assessment, StudentRecord, Subject};
use serde::Serialize;

/// Half-up rounding to a whole number: `Int(x + 0.5)`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Mean of `score` over all entries, rounded. An empty history averages to 0.
pub fn average_score(assessments: &[Assessment]) -> i64 {
    if assessments.is_empty() {
        return 0;
    }
    let sum: f64 = assessments.iter().map(|a| a.score).sum();
    round_half_up(sum / assessments.len() as f64)
}

/// `score / max` as a whole percentage. `None` when `max` is zero; such
/// entries are skipped in any aggregate.
pub fn assessment_percentage(score: f64, max: f64) -> Option<i64> {
    if max == 0.0 || !max.is_finite() {
        return None;
    }
    Some(round_half_up(score / max * 100.0))
}

/// Cutoffs used by the different score views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Strengths vs. areas for improvement on the performance view.
    pub suggestion: i64,
    /// Report preview: at or above is a strength.
    pub report_strength: i64,
    /// Report preview: below is a weakness.
    pub report_weakness: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            suggestion: 75,
            report_strength: 85,
            report_weakness: 75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification<K> {
    pub strengths: Vec<K>,
    pub improvements: Vec<K>,
}

/// Partitions every key into exactly one side: `score >= threshold` is a
/// strength, anything else an area for improvement.
pub fn classify<K, I>(scores: I, threshold: i64) -> Classification<K>
where
    I: IntoIterator<Item = (K, i64)>,
{
    let (strengths, improvements): (Vec<_>, Vec<_>) =
        scores.into_iter().partition(|(_, score)| *score >= threshold);
    Classification {
        strengths: strengths.into_iter().map(|(k, _)| k).collect(),
        improvements: improvements.into_iter().map(|(k, _)| k).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSplit<K> {
    pub strengths: Vec<K>,
    pub weaknesses: Vec<K>,
}

/// Two-cutoff variant used by reports. Scores in `[weak, strong)` land in neither list.
pub fn report_split<K, I>(scores: I, strong: i64, weak: i64) -> ReportSplit<K>
where
    I: IntoIterator<Item = (K, i64)>,
{
    let mut out = ReportSplit {
        strengths: Vec::new(),
        weaknesses: Vec::new(),
    };
    for (key, score) in scores {
        if score >= strong {
            out.strengths.push(key);
        } else if score < weak {
            out.weaknesses.push(key);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionTier {
    Excellent,
    Good,
    NeedsImprovement,
}

impl SuggestionTier {
    pub fn for_score(score: i64) -> Self {
        if score >= 90 {
            SuggestionTier::Excellent
        } else if score >= 75 {
            SuggestionTier::Good
        } else {
            SuggestionTier::NeedsImprovement
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            SuggestionTier::Excellent => "Excellent – Keep it up!",
            SuggestionTier::Good => "Good – You are strong in this subject",
            SuggestionTier::NeedsImprovement => "Needs Improvement – Focus more",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub title: String,
    pub date: String,
    pub score: f64,
    pub max: f64,
    pub percent: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTier {
    pub subject: Subject,
    pub score: i64,
    pub tier: SuggestionTier,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceModel {
    pub student_id: String,
    pub name: String,
    pub class_tag: String,
    pub avg_score: i64,
    /// Mean percentage over entries with a usable `max`.
    pub avg_percent: Option<i64>,
    pub attendance: i64,
    pub assessments: Vec<AssessmentView>,
    pub suggestions: Classification<Subject>,
    pub tiers: Vec<SubjectTier>,
}

pub fn performance_model(record: &StudentRecord, thresholds: &Thresholds) -> PerformanceModel {
    let assessments: Vec<AssessmentView> = record
        .assessments
        .iter()
        .map(|a| AssessmentView {
            title: a.title.clone(),
            date: a.date.clone(),
            score: a.score,
            max: a.max,
            percent: assessment_percentage(a.score, a.max),
        })
        .collect();
    let percents: Vec<i64> = assessments.iter().filter_map(|a| a.percent).collect();
    let avg_percent = if percents.is_empty() {
        None
    } else {
        let sum: i64 = percents.iter().sum();
        Some(round_half_up(sum as f64 / percents.len() as f64))
    };
    let tiers = record
        .subject_scores
        .iter()
        .map(|(subject, score)| {
            let tier = SuggestionTier::for_score(score);
            SubjectTier {
                subject,
                score,
                tier,
                text: tier.text(),
            }
        })
        .collect();

    PerformanceModel {
        student_id: record.id.clone(),
        name: record.name.clone(),
        class_tag: record.class_tag.clone(),
        avg_score: average_score(&record.assessments),
        avg_percent,
        attendance: record.attendance_ratio,
        assessments,
        suggestions: classify(record.subject_scores.iter(), thresholds.suggestion),
        tiers,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub subject: Subject,
    pub avg: i64,
    pub highest: i64,
    pub lowest: i64,
}

/// Per-subject mean, highest and lowest across a roster.
pub fn subject_analytics(records: &[StudentRecord]) -> Vec<SubjectStat> {
    Subject::ALL
        .into_iter()
        .map(|subject| {
            let scores: Vec<i64> = records
                .iter()
                .map(|r| r.subject_scores.get(subject))
                .collect();
            if scores.is_empty() {
                return SubjectStat {
                    subject,
                    avg: 0,
                    highest: 0,
                    lowest: 0,
                };
            }
            let sum: i64 = scores.iter().sum();
            SubjectStat {
                subject,
                avg: round_half_up(sum as f64 / scores.len() as f64),
                highest: scores.iter().copied().max().unwrap_or(0),
                lowest: scores.iter().copied().min().unwrap_or(0),
            }
        })
        .collect()
}

pub fn subject_names(subjects: &[Subject]) -> Vec<&'static str> {
    subjects.iter().map(|s| s.as_str()).collect()
}
