//! Table formatting for CLI output

use crate::output::format_amount;
use chrono::{DateTime, Local};
use console::style;
use lyceum_sdk::{
    Debtor, Enrollment, FinanceOverview, GlobalBalance, Group, Manager, PageMeta, Room, Student,
    Teacher, User,
};
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};

/// Format RFC3339 timestamp to YY-MM-DD HH:MM format in local time
fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| {
            let local_dt = dt.with_timezone(&Local);
            local_dt.format("%y-%m-%d %H:%M").to_string()
        })
        .unwrap_or_else(|| timestamp.to_string())
}

/// Date part of an ISO timestamp (`2025-03-01T00:00:00.000Z` -> `2025-03-01`)
fn format_date(value: Option<&str>) -> String {
    match value {
        Some(value) => value.split('T').next().unwrap_or(value).to_string(),
        None => "-".to_string(),
    }
}

fn format_optional_amount(amount: Option<f64>) -> String {
    amount.map(format_amount).unwrap_or_else(|| "-".to_string())
}

fn active_marker(is_active: bool) -> String {
    if is_active { "✓" } else { "✗" }.to_string()
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

/// Footer under paginated listings
pub fn display_page_footer(meta: &PageMeta) {
    println!(
        "{}",
        style(format!(
            "Page {} of {} ({} total)",
            meta.page,
            meta.pages.max(1),
            meta.total
        ))
        .dim()
    );
}

pub fn display_students(students: &[Student]) {
    #[derive(Tabled)]
    struct StudentRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Phone")]
        phone: String,
        #[tabled(rename = "Started")]
        started: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    let rows: Vec<StudentRow> = students
        .iter()
        .map(|student| StudentRow {
            id: student.id.clone(),
            name: student.full_name.clone(),
            phone: student.phone.clone(),
            started: format_date(student.start_date.as_deref()),
            active: active_marker(student.is_active),
        })
        .collect();

    print_table(rows);
}

pub fn display_teachers(teachers: &[Teacher]) {
    #[derive(Tabled)]
    struct TeacherRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Phone")]
        phone: String,
        #[tabled(rename = "Salary")]
        salary: String,
        #[tabled(rename = "Share %")]
        share: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    let rows: Vec<TeacherRow> = teachers
        .iter()
        .map(|teacher| TeacherRow {
            id: teacher.id.clone(),
            name: teacher.full_name.clone(),
            phone: teacher.phone.clone(),
            salary: format_optional_amount(teacher.monthly_salary),
            share: teacher
                .percent_share
                .map(|share| format!("{share}"))
                .unwrap_or_else(|| "-".to_string()),
            active: active_marker(teacher.is_active),
        })
        .collect();

    print_table(rows);
}

pub fn display_managers(managers: &[Manager]) {
    #[derive(Tabled)]
    struct ManagerRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Phone")]
        phone: String,
        #[tabled(rename = "Salary")]
        salary: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    let rows: Vec<ManagerRow> = managers
        .iter()
        .map(|manager| ManagerRow {
            id: manager.id.clone(),
            name: manager.full_name.clone(),
            phone: manager.phone.clone(),
            salary: format_optional_amount(manager.monthly_salary),
            active: active_marker(manager.is_active),
        })
        .collect();

    print_table(rows);
}

pub fn display_groups(groups: &[Group]) {
    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Days")]
        days: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Capacity")]
        capacity: String,
        #[tabled(rename = "Fee")]
        fee: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    let rows: Vec<GroupRow> = groups
        .iter()
        .map(|group| GroupRow {
            id: group.id.clone(),
            name: group.name.clone(),
            days: format!("{:?}", group.days_pattern).to_uppercase(),
            time: format!("{}-{}", group.start_time, group.end_time),
            capacity: group
                .capacity
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fee: format_optional_amount(group.monthly_fee),
            active: active_marker(group.is_active),
        })
        .collect();

    print_table(rows);
}

pub fn display_rooms(rooms: &[Room]) {
    #[derive(Tabled)]
    struct RoomRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Capacity")]
        capacity: String,
    }

    let rows: Vec<RoomRow> = rooms
        .iter()
        .map(|room| RoomRow {
            id: room.id.clone(),
            name: room.name.clone(),
            capacity: room
                .capacity
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    print_table(rows);
}

pub fn display_enrollments(enrollments: &[Enrollment]) {
    #[derive(Tabled)]
    struct EnrollmentRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Student")]
        student: String,
        #[tabled(rename = "Group")]
        group: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Joined")]
        joined: String,
        #[tabled(rename = "Left")]
        left: String,
    }

    let rows: Vec<EnrollmentRow> = enrollments
        .iter()
        .map(|enrollment| EnrollmentRow {
            id: enrollment.id.clone(),
            student: enrollment
                .student
                .as_ref()
                .map(|s| s.full_name.clone())
                .unwrap_or_else(|| "-".to_string()),
            group: enrollment
                .group
                .as_ref()
                .map(|g| g.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            status: format!("{:?}", enrollment.status).to_uppercase(),
            joined: format_date(Some(&enrollment.join_date)),
            left: format_date(enrollment.leave_date.as_deref()),
        })
        .collect();

    print_table(rows);
}

pub fn display_debtors(debtors: &[Debtor]) {
    #[derive(Tabled)]
    struct DebtorRow {
        #[tabled(rename = "Student")]
        student: String,
        #[tabled(rename = "Phone")]
        phone: String,
        #[tabled(rename = "Debt")]
        debt: String,
        #[tabled(rename = "Groups")]
        groups: String,
    }

    let rows: Vec<DebtorRow> = debtors
        .iter()
        .map(|debtor| DebtorRow {
            student: debtor.full_name.clone(),
            phone: debtor.phone.clone(),
            debt: format_amount(debtor.total_debt),
            groups: debtor
                .groups
                .iter()
                .map(|g| format!("{} ({})", g.name, format_amount(g.debt)))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    print_table(rows);
}

/// Two-column key/value table
fn display_pairs(pairs: Vec<(&str, String)>) {
    #[derive(Tabled)]
    struct PairRow {
        #[tabled(rename = "")]
        key: String,
        #[tabled(rename = "")]
        value: String,
    }

    let rows: Vec<PairRow> = pairs
        .into_iter()
        .map(|(key, value)| PairRow {
            key: key.to_string(),
            value,
        })
        .collect();

    print_table(rows);
}

pub fn display_balance(balance: &GlobalBalance) {
    display_pairs(vec![
        ("Charges", format_amount(balance.total_charges)),
        ("Income", format_amount(balance.total_income)),
        ("Expense", format_amount(balance.total_expense)),
        ("Net cash", format_amount(balance.net_cash)),
        ("Outstanding debt", format_amount(balance.total_debt)),
    ]);
}

pub fn display_overview(overview: &FinanceOverview) {
    display_pairs(vec![
        ("From", format_timestamp(&overview.from)),
        ("To", format_timestamp(&overview.to)),
        ("Income", format_amount(overview.total_income)),
        ("Expense", format_amount(overview.total_expense)),
        ("Profit", format_amount(overview.profit)),
    ]);
}

pub fn display_user(user: &User) {
    let mut pairs = vec![
        ("ID", user.id.clone()),
        ("Name", user.full_name()),
        ("Phone", user.phone.clone()),
        ("Role", user.role.to_string()),
    ];
    if let Some(email) = &user.email {
        pairs.push(("Email", email.clone()));
    }
    pairs.push(("Active", active_marker(user.is_active)));
    display_pairs(pairs);
}

/// Display configuration in table format
pub fn display_config(config: &BTreeMap<String, String>) {
    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<ConfigRow> = config
        .iter()
        .map(|(key, value)| ConfigRow {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    print_table(rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2025-03-01T00:00:00.000Z")), "2025-03-01");
        assert_eq!(format_date(Some("2025-03-01")), "2025-03-01");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_format_timestamp_keeps_unparseable_input() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
