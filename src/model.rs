use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One class roster entry. Students are owned by the class; their order is
/// the roster display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
}

/// Attendance state for one (dateKey, classId) pair. Absent from the ledger
/// means uninitialized, which reads the same as the default here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayClassAttendance {
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

/// dateKey (YYYY-MM-DD) -> classId -> per-day attendance. BTreeMap keeps
/// dateKey iteration ascending, which is the report row order.
pub type Ledger = BTreeMap<String, BTreeMap<String, DayClassAttendance>>;

/// Field merge for student updates. A present field replaces the stored
/// value; an empty string supplied for an optional field clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
}

impl StudentPatch {
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.trim().to_string();
        }
        apply_optional(&mut student.phone, &self.phone);
        apply_optional(&mut student.parent_name, &self.parent_name);
        apply_optional(&mut student.parent_phone, &self.parent_phone);
        apply_optional(&mut student.address, &self.address);
        apply_optional(&mut student.date_of_birth, &self.date_of_birth);
    }
}

fn apply_optional(target: &mut Option<String>, patch: &Option<String>) {
    if let Some(value) = patch {
        let trimmed = value.trim();
        *target = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}
