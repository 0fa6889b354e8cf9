use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static STUDENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid regex"));

/// Ids are allocated above this floor when no conforming id exists yet.
pub const STUDENT_ID_FLOOR: u32 = 24000;
/// Largest value that still fits the 5-digit form.
pub const STUDENT_ID_MAX: u32 = 99_999;

pub fn is_allocated_form(id: &str) -> bool {
    STUDENT_ID_RE.is_match(id)
}

/// Next student id: one past the largest 5-digit numeric id, zero padded.
/// Ids of any other shape stay valid keys but never influence the result.
///
/// Once `99999` is taken the lowest free value above the floor is reused,
/// then the lowest free value at or below it. `None` means every 5-digit id
/// is in use.
pub fn allocate<'a, I>(existing: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: BTreeSet<u32> = existing
        .into_iter()
        .filter(|id| is_allocated_form(id))
        .filter_map(|id| id.parse::<u32>().ok())
        .collect();
    let max_id = taken.last().copied().unwrap_or(STUDENT_ID_FLOOR);
    let next = if max_id < STUDENT_ID_MAX {
        Some(max_id + 1)
    } else {
        (STUDENT_ID_FLOOR + 1..=STUDENT_ID_MAX)
            .chain(0..=STUDENT_ID_FLOOR)
            .find(|n| !taken.contains(n))
    };
    next.map(|n| format!("{:05}", n))
}

/// Teacher ids are plain integers starting at 1.
pub fn next_teacher_id<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map(|m| m + 1).unwrap_or(1)
}
