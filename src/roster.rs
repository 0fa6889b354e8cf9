//! Session roster: the in-memory student and teacher collections plus the two
//! stores behind them.
//!
//! Roster writes are write-through-confirm: the durable store must accept a
//! change before the local collection reflects it, and a failed write leaves
//! local state as it was. Notes and today's attendance marks live only in the
//! session and are updated immediately.

use crate::attendance::{self, AttendanceTotals};
use crate::calc::{self, PerformanceModel, SubjectStat, Thresholds};
use crate::clock::{Clock, DATE_FORMAT};
use crate::error::{EngineError, EngineResult};
use crate::ids;
use crate::mapping;
use crate::model::{
    Assessment, AttendanceMark, StudentRecord, Subject, SubjectScores, TeacherRecord,
};
use crate::normalize::{self, normalize};
use crate::report::{self, CsvQuoting, ReportContext, ReportType};
use crate::store::{NoteStore, RecordStore};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

pub const DEFAULT_CLASS_TAG: &str = "Grade 10A";
const NEW_STUDENT_ATTENDANCE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub class_tag: Option<String>,
    /// When present, every subject must be given.
    pub marks: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub classes: Vec<String>,
}

fn require_text(value: &str, field: &str) -> EngineResult<String> {
    let t = value.trim();
    if t.is_empty() {
        return Err(EngineError::validation(format!("{} must not be empty", field))
            .with_details(json!({ "field": field })));
    }
    Ok(t.to_string())
}

fn marks_to_scores(marks: &Map<String, Value>) -> EngineResult<SubjectScores> {
    let mut found: Vec<(Subject, i64)> = Vec::new();
    for (key, value) in marks {
        if value.is_null() {
            continue;
        }
        if let Some(subject) = Subject::parse(key) {
            found.push((subject, normalize::coerce_score(Some(value))));
        }
    }
    let missing: Vec<&str> = Subject::ALL
        .into_iter()
        .filter(|s| !found.iter().any(|(f, _)| f == s))
        .map(|s| s.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::validation("marks for every subject are required")
            .with_details(json!({ "missing": missing })));
    }
    Ok(found.into_iter().collect())
}

pub struct Dashboard {
    records: Box<dyn RecordStore>,
    notes: Box<dyn NoteStore>,
    clock: Box<dyn Clock>,
    thresholds: Thresholds,
    roster: Vec<StudentRecord>,
    teachers: Vec<TeacherRecord>,
}

impl Dashboard {
    /// Lists the durable store and normalizes every row into the roster.
    /// Rows whose id repeats an earlier row are dropped.
    pub fn load(
        records: Box<dyn RecordStore>,
        notes: Box<dyn NoteStore>,
        clock: Box<dyn Clock>,
        thresholds: Thresholds,
    ) -> EngineResult<Self> {
        let raw = records.list()?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut roster = Vec::with_capacity(raw.len());
        for (idx, row) in raw.iter().enumerate() {
            let rec = normalize(row, idx, clock.as_ref());
            if !seen.insert(rec.id.clone()) {
                tracing::warn!(student_id = %rec.id, "duplicate student id in store; row skipped");
                continue;
            }
            roster.push(rec);
        }
        tracing::info!(students = roster.len(), "roster loaded");
        Ok(Self {
            records,
            notes,
            clock,
            thresholds,
            roster,
            teachers: Vec::new(),
        })
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.roster
    }

    pub fn student(&self, id: &str) -> EngineResult<&StudentRecord> {
        self.roster.iter().find(|s| s.id == id).ok_or_else(|| {
            EngineError::not_found("student not found").with_details(json!({ "studentId": id }))
        })
    }

    fn student_mut(&mut self, id: &str) -> EngineResult<&mut StudentRecord> {
        self.roster.iter_mut().find(|s| s.id == id).ok_or_else(|| {
            EngineError::not_found("student not found").with_details(json!({ "studentId": id }))
        })
    }

    pub fn add_student(&mut self, new: NewStudent) -> EngineResult<StudentRecord> {
        let name = require_text(&new.name, "name")?;
        let email = require_text(&new.email, "email")?;
        let subject_scores = match new.marks.as_ref() {
            Some(marks) => marks_to_scores(marks)?,
            None => SubjectScores::default(),
        };
        let class_tag = new
            .class_tag
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CLASS_TAG.to_string());

        let id = ids::allocate(self.roster.iter().map(|s| s.id.as_str()))
            .ok_or_else(|| EngineError::validation("no free 5-digit student id remains"))?;
        let today = self.clock.today().format(DATE_FORMAT).to_string();
        let record = StudentRecord {
            id,
            name,
            email,
            class_tag,
            enrollment_date: today.clone(),
            attendance_ratio: NEW_STUDENT_ATTENDANCE,
            assessments: vec![Assessment {
                title: "Quiz 1".to_string(),
                date: today,
                score: 0.0,
                max: 100.0,
            }],
            subject_scores,
            total_days: 0,
            present_days: 0,
            today_mark: None,
        };

        let body = serde_json::to_value(&record)
            .map_err(|e| EngineError::persistence(format!("failed to encode record: {e}")))?;
        let echoed = self.records.create(&body).map_err(|e| {
            tracing::warn!(student_id = %record.id, error = %e, "store rejected new student");
            EngineError::from(e).with_details(json!({ "studentId": record.id }))
        })?;

        let stored = normalize(&echoed, self.roster.len(), self.clock.as_ref());
        if self.roster.iter().any(|s| s.id == stored.id) {
            // Undo under the id we wrote; the echoed id belongs to a roster row.
            let rolled_back = match self.records.remove(&record.id) {
                Ok(removed) => removed,
                Err(e) => {
                    tracing::warn!(student_id = %record.id, error = %e, "rollback failed");
                    false
                }
            };
            return Err(EngineError::persistence("store returned an id already in use")
                .with_details(json!({
                    "studentId": stored.id,
                    "written": record.id,
                    "rolledBack": rolled_back,
                })));
        }
        tracing::info!(student_id = %stored.id, "student added");
        self.roster.push(stored.clone());
        Ok(stored)
    }

    pub fn remove_student(&mut self, id: &str) -> EngineResult<()> {
        self.student(id)?;
        let removed = self.records.remove(id).map_err(|e| {
            tracing::warn!(student_id = %id, error = %e, "store failed to remove student");
            EngineError::from(e)
        })?;
        if !removed {
            tracing::warn!(student_id = %id, "student missing from store");
            return Err(
                EngineError::persistence("student is not in the durable store")
                    .with_details(json!({ "studentId": id })),
            );
        }
        self.roster.retain(|s| s.id != id);
        self.notes.put(id, Vec::new());
        tracing::info!(student_id = %id, "student removed");
        Ok(())
    }

    pub fn performance(&self, id: &str) -> EngineResult<PerformanceModel> {
        Ok(calc::performance_model(self.student(id)?, &self.thresholds))
    }

    pub fn subject_analytics(&self) -> Vec<SubjectStat> {
        calc::subject_analytics(&self.roster)
    }

    pub fn mark_attendance(&mut self, id: &str, mark: AttendanceMark) -> EngineResult<()> {
        let rec = self.student_mut(id)?;
        attendance::set_today_mark(rec, mark);
        Ok(())
    }

    pub fn commit_attendance(&mut self, id: &str) -> EngineResult<AttendanceTotals> {
        let rec = self.student_mut(id)?;
        let totals = attendance::commit(rec)?;
        tracing::debug!(
            student_id = %id,
            total_days = totals.total_days,
            present_days = totals.present_days,
            "attendance committed"
        );
        Ok(totals)
    }

    pub fn notes(&self, id: &str) -> EngineResult<Vec<String>> {
        self.student(id)?;
        Ok(self.notes.get(id))
    }

    pub fn add_note(&mut self, id: &str, text: &str) -> EngineResult<Vec<String>> {
        let text = require_text(text, "text")?;
        self.student(id)?;
        let mut notes = self.notes.get(id);
        notes.push(text);
        self.notes.put(id, notes.clone());
        Ok(notes)
    }

    pub fn compose_report(
        &self,
        report_type: ReportType,
        student_id: Option<&str>,
    ) -> EngineResult<String> {
        let student = match student_id {
            Some(id) => Some(self.student(id)?),
            None => None,
        };
        let ctx = ReportContext {
            student_count: self.roster.len(),
            student,
        };
        Ok(report::compose(
            report_type,
            &ctx,
            self.clock.as_ref(),
            &self.thresholds,
        ))
    }

    pub fn export_csv(&self, quoting: CsvQuoting) -> String {
        report::export_csv(&self.roster, quoting)
    }

    pub fn teachers(&self) -> &[TeacherRecord] {
        &self.teachers
    }

    pub fn add_teacher(&mut self, new: NewTeacher) -> EngineResult<TeacherRecord> {
        let name = require_text(&new.name, "name")?;
        let email = require_text(&new.email, "email")?;
        let mut classes: Vec<String> = Vec::new();
        for c in new.classes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !classes.iter().any(|x| x == c) {
                classes.push(c.to_string());
            }
        }
        let teacher = TeacherRecord {
            id: ids::next_teacher_id(self.teachers.iter().map(|t| t.id)),
            name,
            email,
            subject: new.subject.trim().to_string(),
            classes,
        };
        tracing::info!(teacher_id = teacher.id, "teacher added");
        self.teachers.push(teacher.clone());
        Ok(teacher)
    }

    pub fn remove_teacher(&mut self, id: i64) -> EngineResult<()> {
        let before = self.teachers.len();
        self.teachers.retain(|t| t.id != id);
        if self.teachers.len() == before {
            return Err(EngineError::not_found("teacher not found")
                .with_details(json!({ "teacherId": id })));
        }
        Ok(())
    }

    pub fn map_student(
        &mut self,
        student_id: &str,
        teacher_id: i64,
    ) -> EngineResult<TeacherRecord> {
        mapping::map_student(&self.roster, &mut self.teachers, student_id, teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ErrorKind;
    use crate::store::MemoryNoteStore;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct MemoryRecordStore {
        rows: Rc<RefCell<Vec<Value>>>,
        fail_writes: bool,
        /// Id the store reports back instead of the one it was given.
        echo_id: Option<String>,
    }

    impl RecordStore for MemoryRecordStore {
        fn list(&self) -> anyhow::Result<Vec<Value>> {
            Ok(self.rows.borrow().clone())
        }

        fn create(&mut self, record: &Value) -> anyhow::Result<Value> {
            if self.fail_writes {
                return Err(anyhow!("connection reset"));
            }
            let mut echoed = record.clone();
            echoed["createdAt"] = json!("2026-10-19T10:00:00Z");
            self.rows.borrow_mut().push(echoed.clone());
            if let Some(id) = &self.echo_id {
                echoed["id"] = json!(id);
            }
            Ok(echoed)
        }

        fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
            if self.fail_writes {
                return Err(anyhow!("connection reset"));
            }
            let mut rows = self.rows.borrow_mut();
            let before = rows.len();
            rows.retain(|r| r["id"] != id);
            Ok(rows.len() != before)
        }
    }

    fn clock() -> FixedClock {
        FixedClock::at(NaiveDate::from_ymd_opt(2026, 10, 19).expect("date"), 10, 0, 0)
    }

    fn dashboard(store: MemoryRecordStore) -> Dashboard {
        Dashboard::load(
            Box::new(store),
            Box::new(MemoryNoteStore::default()),
            Box::new(clock()),
            Thresholds::default(),
        )
        .expect("load")
    }

    fn seeded(fail_writes: bool) -> MemoryRecordStore {
        let store = MemoryRecordStore {
            fail_writes,
            ..Default::default()
        };
        store.rows.borrow_mut().extend([
            json!({
                "id": "24001",
                "name": "Emily Davis",
                "email": "emily@school.com",
                "class": "Grade 10A",
            }),
            json!({
                "id": "24002",
                "name": "James Wilson",
                "email": "james@school.com",
                "class": "Grade 10A",
            }),
        ]);
        store
    }

    fn new_student(name: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            email: format!("{}@school.com", name.to_lowercase()),
            ..Default::default()
        }
    }

    #[test]
    fn add_allocates_next_id_and_writes_through() {
        let store = seeded(false);
        let mut dash = dashboard(store.clone());
        let added = dash.add_student(new_student("Rohan")).expect("add");
        assert_eq!(added.id, "24003");
        assert_eq!(added.enrollment_date, "2026-10-19");
        assert_eq!(added.attendance_ratio, 100);
        assert_eq!(added.class_tag, DEFAULT_CLASS_TAG);
        assert_eq!(dash.students().len(), 3);
        assert_eq!(store.rows.borrow().len(), 3);
    }

    #[test]
    fn failed_write_leaves_roster_unchanged() {
        let mut dash = dashboard(seeded(true));
        let before: Vec<_> = dash.students().to_vec();
        let e = dash.add_student(new_student("Rohan")).expect_err("write fails");
        assert_eq!(e.kind, ErrorKind::Persistence);
        assert_eq!(dash.students(), before.as_slice());

        let e = dash.remove_student("24001").expect_err("remove fails");
        assert_eq!(e.kind, ErrorKind::Persistence);
        assert_eq!(dash.students().len(), 2);
    }

    #[test]
    fn colliding_echo_is_rolled_back() {
        let store = MemoryRecordStore {
            echo_id: Some("24001".to_string()),
            ..seeded(false)
        };
        let mut dash = dashboard(store.clone());
        let e = dash.add_student(new_student("Rohan")).expect_err("echo collides");
        assert_eq!(e.kind, ErrorKind::Persistence);
        assert_eq!(e.details.expect("details")["rolledBack"], json!(true));
        assert_eq!(dash.students().len(), 2);

        let ids: Vec<Value> = store.rows.borrow().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("24001"), json!("24002")]);
    }

    #[test]
    fn remove_of_row_missing_from_store_fails() {
        let store = seeded(false);
        let mut dash = dashboard(store.clone());
        store.rows.borrow_mut().retain(|r| r["id"] != "24002");

        let e = dash.remove_student("24002").expect_err("not in store");
        assert_eq!(e.kind, ErrorKind::Persistence);
        assert!(dash.student("24002").is_ok());
    }

    #[test]
    fn validation_happens_before_any_write() {
        let store = seeded(false);
        let mut dash = dashboard(store.clone());
        let e = dash
            .add_student(NewStudent {
                name: "  ".to_string(),
                email: "x@school.com".to_string(),
                ..Default::default()
            })
            .expect_err("blank name");
        assert_eq!(e.kind, ErrorKind::Validation);

        let mut marks = Map::new();
        marks.insert("Math".to_string(), json!(90));
        marks.insert("Science".to_string(), json!("abc"));
        let e = dash
            .add_student(NewStudent {
                marks: Some(marks),
                ..new_student("Ava")
            })
            .expect_err("missing marks");
        assert_eq!(e.kind, ErrorKind::Validation);
        assert_eq!(
            e.details.expect("details")["missing"],
            json!(["English", "History", "Art"])
        );
        assert_eq!(store.rows.borrow().len(), 2);
    }

    #[test]
    fn marks_coerce_leniently() {
        let mut dash = dashboard(seeded(false));
        let marks: Map<String, Value> = serde_json::from_value(json!({
            "Math": 91, "Science": "abc", "English": "77", "History": 60.4, "Art": 85
        }))
        .expect("marks");
        let added = dash
            .add_student(NewStudent {
                marks: Some(marks),
                ..new_student("Ava")
            })
            .expect("add");
        assert_eq!(added.subject_scores.get(Subject::Math), 91);
        assert_eq!(added.subject_scores.get(Subject::Science), 0);
        assert_eq!(added.subject_scores.get(Subject::English), 77);
        assert_eq!(added.subject_scores.get(Subject::History), 60);
    }

    #[test]
    fn duplicate_rows_are_dropped_on_load() {
        let store = seeded(false);
        store
            .rows
            .borrow_mut()
            .push(json!({ "id": "24001", "name": "Copy" }));
        let dash = dashboard(store);
        assert_eq!(dash.students().len(), 2);
        assert_eq!(dash.students()[0].name, "Emily Davis");
    }

    #[test]
    fn notes_append_per_student() {
        let mut dash = dashboard(seeded(false));
        dash.add_note("24001", "Practice fractions").expect("note");
        let notes = dash.add_note("24001", "Great essay").expect("note");
        assert_eq!(notes, vec!["Practice fractions", "Great essay"]);
        assert!(dash.notes("24002").expect("notes").is_empty());
        assert_eq!(
            dash.add_note("nope", "x").expect_err("unknown").kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            dash.add_note("24001", " ").expect_err("blank").kind,
            ErrorKind::Validation
        );
    }

    #[test]
    fn remove_clears_notes() {
        let mut dash = dashboard(seeded(false));
        dash.add_note("24002", "Check in").expect("note");
        dash.remove_student("24002").expect("remove");
        assert!(dash.student("24002").is_err());
        dash.add_student(new_student("Nia")).expect("add");
        assert_eq!(dash.students()[1].id, "24002");
        assert!(dash.notes("24002").expect("notes").is_empty());
    }

    #[test]
    fn attendance_flows_through_roster() {
        let mut dash = dashboard(seeded(false));
        assert_eq!(
            dash.commit_attendance("24001").expect_err("no mark").kind,
            ErrorKind::AccumulatorState
        );
        dash.mark_attendance("24001", AttendanceMark::Absent).expect("mark");
        let totals = dash.commit_attendance("24001").expect("commit");
        assert_eq!(totals.attendance, 0);
        assert_eq!(dash.student("24001").expect("student").total_days, 1);
    }

    #[test]
    fn teachers_and_mapping() {
        let mut dash = dashboard(seeded(false));
        let t = dash
            .add_teacher(NewTeacher {
                name: "John Smith".to_string(),
                email: "john@school.com".to_string(),
                subject: "Math".to_string(),
                classes: vec!["Grade 9B".to_string(), " ".to_string()],
            })
            .expect("teacher");
        assert_eq!(t.id, 1);
        assert_eq!(t.classes, vec!["Grade 9B"]);
        dash.map_student("24001", 1).expect("map");
        let mapped = dash.map_student("24002", 1).expect("map");
        assert_eq!(mapped.classes, vec!["Grade 9B", "Grade 10A"]);
        dash.remove_teacher(1).expect("remove");
        assert_eq!(
            dash.remove_teacher(1).expect_err("gone").kind,
            ErrorKind::NotFound
        );
    }

    #[test]
    fn report_for_unknown_student_is_not_found() {
        let dash = dashboard(seeded(false));
        let e = dash
            .compose_report(ReportType::Performance, Some("24999"))
            .expect_err("unknown");
        assert_eq!(e.kind, ErrorKind::NotFound);
        let text = dash
            .compose_report(ReportType::Performance, None)
            .expect("class report");
        assert!(text.starts_with("Performance Report generated for 2 students."));
    }
}
