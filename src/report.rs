use crate::calc::{self, Thresholds};
use crate::clock::{Clock, TIMESTAMP_FORMAT};
use crate::model::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Performance,
    Attendance,
    Progress,
}

impl ReportType {
    pub fn parse(s: &str) -> Option<ReportType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "performance" | "performance report" => Some(ReportType::Performance),
            "attendance" | "attendance report" => Some(ReportType::Attendance),
            "progress" | "progress report" => Some(ReportType::Progress),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportType::Performance => "Performance Report",
            ReportType::Attendance => "Attendance Report",
            ReportType::Progress => "Progress Report",
        }
    }
}

pub struct ReportContext<'a> {
    pub student_count: usize,
    pub student: Option<&'a StudentRecord>,
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

pub fn compose(
    report_type: ReportType,
    ctx: &ReportContext<'_>,
    clock: &dyn Clock,
    thresholds: &Thresholds,
) -> String {
    let Some(student) = ctx.student else {
        return format!(
            "{} generated for {} students.\nGenerated at: {}",
            report_type.label(),
            ctx.student_count,
            clock.now().format(TIMESTAMP_FORMAT)
        );
    };

    let split = calc::report_split(
        student.subject_scores.iter(),
        thresholds.report_strength,
        thresholds.report_weakness,
    );
    format!(
        "Report for {}\nClass: {}\nAvg Score: {}\nAttendance: {}%\n\
         Strengths: {}\nNeeds Improvement: {}",
        student.name,
        student.class_tag,
        calc::average_score(&student.assessments),
        student.attendance_ratio,
        join_or_none(&calc::subject_names(&split.strengths)),
        join_or_none(&calc::subject_names(&split.weaknesses)),
    )
}

pub const CSV_HEADER: &str = "Name,Email,Class,Enrolled,Attendance,AvgScore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvQuoting {
    /// Fields joined as-is; embedded commas or quotes are not escaped.
    #[default]
    Raw,
    /// RFC 4180 quoting for fields containing a delimiter, quote or newline.
    Rfc4180,
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn export_csv(records: &[StudentRecord], quoting: CsvQuoting) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for r in records {
        let fields = [
            r.name.clone(),
            r.email.clone(),
            r.class_tag.clone(),
            r.enrollment_date.clone(),
            r.attendance_ratio.to_string(),
            calc::average_score(&r.assessments).to_string(),
        ];
        let row: Vec<String> = match quoting {
            CsvQuoting::Raw => fields.to_vec(),
            CsvQuoting::Rfc4180 => fields.iter().map(|f| csv_quote(f)).collect(),
        };
        lines.push(row.join(","));
    }
    lines.join("\n")
}
