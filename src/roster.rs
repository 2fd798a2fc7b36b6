use crate::model::{Class, Student, StudentPatch};
use crate::store;
use rusqlite::Connection;
use uuid::Uuid;

pub fn list_classes(conn: &Connection) -> anyhow::Result<Vec<Class>> {
    store::load_classes(conn)
}

pub fn find_class<'a>(classes: &'a [Class], class_id: &str) -> Option<&'a Class> {
    classes.iter().find(|c| c.id == class_id)
}

pub fn find_student<'a>(classes: &'a [Class], class_id: &str, student_id: &str) -> Option<&'a Student> {
    find_class(classes, class_id).and_then(|c| c.students.iter().find(|s| s.id == student_id))
}

pub fn add_class(conn: &Connection, name: &str) -> anyhow::Result<Class> {
    let mut classes = store::load_classes(conn)?;
    let class = Class {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        students: Vec::new(),
    };
    classes.push(class.clone());
    store::save_classes(conn, &classes)?;
    Ok(class)
}

pub fn update_class(conn: &Connection, class_id: &str, name: &str) -> anyhow::Result<Option<Class>> {
    let mut classes = store::load_classes(conn)?;
    let Some(class) = classes.iter_mut().find(|c| c.id == class_id) else {
        return Ok(None);
    };
    class.name = name.to_string();
    let updated = class.clone();
    store::save_classes(conn, &classes)?;
    Ok(Some(updated))
}

/// Removes the class and every attendance entry that referenced it, on every
/// historical date, lock state notwithstanding. Idempotent: deleting an
/// unknown class still sweeps the ledger, so entries orphaned by an earlier
/// partial cascade get cleaned up too.
pub fn delete_class(conn: &Connection, class_id: &str) -> anyhow::Result<bool> {
    let mut classes = store::load_classes(conn)?;
    let before = classes.len();
    classes.retain(|c| c.id != class_id);
    let removed = classes.len() != before;
    store::save_classes(conn, &classes)?;

    let mut ledger = store::load_ledger(conn)?;
    for by_class in ledger.values_mut() {
        by_class.remove(class_id);
    }
    store::save_ledger(conn, &ledger)?;
    Ok(removed)
}

pub fn add_student(
    conn: &Connection,
    class_id: &str,
    student: Student,
) -> anyhow::Result<Option<Student>> {
    let mut classes = store::load_classes(conn)?;
    let Some(class) = classes.iter_mut().find(|c| c.id == class_id) else {
        return Ok(None);
    };
    class.students.push(student.clone());
    store::save_classes(conn, &classes)?;
    Ok(Some(student))
}

pub fn update_student(
    conn: &Connection,
    class_id: &str,
    student_id: &str,
    patch: &StudentPatch,
) -> anyhow::Result<Option<Student>> {
    let mut classes = store::load_classes(conn)?;
    let Some(class) = classes.iter_mut().find(|c| c.id == class_id) else {
        return Ok(None);
    };
    let Some(student) = class.students.iter_mut().find(|s| s.id == student_id) else {
        return Ok(None);
    };
    patch.apply(student);
    let updated = student.clone();
    store::save_classes(conn, &classes)?;
    Ok(Some(updated))
}

/// Removes the student from the class roster and every record referencing
/// them across all dates in the class's ledger entries, locked days
/// included: the referenced student no longer exists, so the sign-off lock
/// does not apply to this cleanup. No-op when the class is unknown.
pub fn delete_student(conn: &Connection, class_id: &str, student_id: &str) -> anyhow::Result<bool> {
    let mut classes = store::load_classes(conn)?;
    let Some(class) = classes.iter_mut().find(|c| c.id == class_id) else {
        return Ok(false);
    };
    let before = class.students.len();
    class.students.retain(|s| s.id != student_id);
    let removed = class.students.len() != before;
    store::save_classes(conn, &classes)?;

    let mut ledger = store::load_ledger(conn)?;
    for by_class in ledger.values_mut() {
        if let Some(day) = by_class.get_mut(class_id) {
            day.records.retain(|r| r.student_id != student_id);
        }
    }
    store::save_ledger(conn, &ledger)?;
    Ok(removed)
}

pub fn new_student(name: &str) -> Student {
    Student {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone: None,
        parent_name: None,
        parent_phone: None,
        address: None,
        date_of_birth: None,
    }
}
