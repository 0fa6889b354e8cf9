use crate::error::{EngineError, EngineResult};
use crate::model::{StudentRecord, TeacherRecord};
use serde_json::json;

/// Adopts the student's class tag into the teacher's class set. Applying the
/// same pair again leaves the set unchanged. The student is never touched.
pub fn map_student(
    students: &[StudentRecord],
    teachers: &mut [TeacherRecord],
    student_id: &str,
    teacher_id: i64,
) -> EngineResult<TeacherRecord> {
    let student = students
        .iter()
        .find(|s| s.id == student_id)
        .ok_or_else(|| {
            EngineError::not_found("student not found")
                .with_details(json!({ "studentId": student_id }))
        })?;
    let teacher = teachers
        .iter_mut()
        .find(|t| t.id == teacher_id)
        .ok_or_else(|| {
            EngineError::not_found("teacher not found")
                .with_details(json!({ "teacherId": teacher_id }))
        })?;

    if !teacher.classes.iter().any(|c| *c == student.class_tag) {
        teacher.classes.push(student.class_tag.clone());
    }
    Ok(teacher.clone())
}

/// Splits comma-separated class text into trimmed, non-empty, distinct tags.
pub fn parse_class_list(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !out.iter().any(|c| c == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
