//! Plain-text table and formatting helpers for command output.

use techflow_core::models::{Project, Task, TeamMember};

/// Format an ISO timestamp or plain date to a short readable form
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub fn print_projects(projects: &[Project]) {
    println!(
        "{:<26} {:<28} {:<11} {:<12}",
        "ID", "NAME", "STATUS", "CREATED"
    );
    for project in projects {
        println!(
            "{:<26} {:<28} {:<11} {:<12}",
            truncate(&project.id, 26),
            truncate(&project.name, 28),
            project.status.to_string(),
            or_dash(project.created_at.as_deref().map(format_date).as_deref()),
        );
    }
}

pub fn print_project_detail(project: &Project) {
    println!("{} ({})", project.name, project.id);
    println!("  Status:      {}", project.status);
    if !project.description.is_empty() {
        println!("  Description: {}", project.description);
    }
    if let Some(ref created) = project.created_at {
        println!("  Created:     {}", format_date(created));
    }
    if let Some(ref updated) = project.updated_at {
        println!("  Updated:     {}", format_date(updated));
    }
    if let Some(ref tasks) = project.tasks {
        println!("  Tasks:       {}", tasks.len());
        if !tasks.is_empty() {
            println!();
            print_tasks(tasks);
        }
    }
}

pub fn print_tasks(tasks: &[Task]) {
    println!(
        "{:<26} {:<30} {:<12} {:<8} {:<12}",
        "ID", "TITLE", "STATUS", "PRI", "DUE"
    );
    for task in tasks {
        println!(
            "{:<26} {:<30} {:<12} {:<8} {:<12}",
            truncate(&task.id, 26),
            truncate(&task.title, 30),
            task.status.to_string(),
            task.priority.to_string(),
            or_dash(task.due_date.as_deref().map(format_date).as_deref()),
        );
    }
}

pub fn print_task_detail(task: &Task) {
    println!("{} ({})", task.title, task.id);
    println!("  Status:      {}", task.status);
    println!("  Priority:    {}", task.priority);
    if !task.description.is_empty() {
        println!("  Description: {}", task.description);
    }
    if let Some(ref due) = task.due_date {
        println!("  Due:         {}", format_date(due));
    }
    match (&task.project, &task.project_id) {
        (Some(project), _) => println!("  Project:     {} ({})", project.name, project.id),
        (None, Some(id)) => println!("  Project:     {}", id),
        (None, None) => {}
    }
    match (&task.assigned_user, &task.assigned_to) {
        (Some(user), _) => println!("  Assigned:    {} <{}>", user.name, user.email),
        (None, Some(id)) => println!("  Assigned:    {}", id),
        (None, None) => {}
    }
}

pub fn print_members(members: &[TeamMember]) {
    println!("{:<26} {:<24} {:<30}", "ID", "NAME", "EMAIL");
    for member in members {
        println!(
            "{:<26} {:<24} {:<30}",
            truncate(&member.id, 26),
            truncate(&member.name, 24),
            member.email
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-11-03T18:22:45.000Z"), "Nov 03, 2025");
        assert_eq!(format_date("2025-12-01"), "2025-12-01");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }
}
