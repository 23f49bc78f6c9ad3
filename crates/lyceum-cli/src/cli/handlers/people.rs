//! Student, teacher and manager command handlers

use crate::cli::commands::PeopleAction;
use crate::client::create_authenticated_client;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, print_info, print_success, table_output};
use lyceum_sdk::Teacher;
use tracing::info;

/// Handle `students` subcommands
pub async fn handle_students(action: PeopleAction, config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;

    match action {
        PeopleAction::Ls { filters } => {
            info!("Fetching students...");
            let page = client.list_students(&filters.to_query()).await?;
            if json {
                return json_output(&page);
            }
            if page.items.is_empty() {
                print_info("No students found");
                return Ok(());
            }
            table_output::display_students(&page.items);
            table_output::display_page_footer(&page.meta);
        }
        PeopleAction::Show { id } => {
            let student = client.get_student(&id).await?;
            if json {
                return json_output(&student);
            }
            table_output::display_students(std::slice::from_ref(&student));
        }
        PeopleAction::Archive { id } => {
            client.archive_student(&id).await?;
            print_success(&format!("Student {id} archived"));
        }
        PeopleAction::Restore { id } => {
            client.restore_student(&id).await?;
            print_success(&format!("Student {id} restored"));
        }
    }
    Ok(())
}

/// Handle `teachers` subcommands shared with other people
pub async fn handle_teachers(action: PeopleAction, config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;

    match action {
        PeopleAction::Ls { filters } => {
            info!("Fetching teachers...");
            let page = client.list_teachers(&filters.to_query()).await?;
            if json {
                return json_output(&page);
            }
            if page.items.is_empty() {
                print_info("No teachers found");
                return Ok(());
            }
            table_output::display_teachers(&page.items);
            table_output::display_page_footer(&page.meta);
        }
        PeopleAction::Show { id } => {
            let teacher = client.get_teacher(&id).await?;
            if json {
                return json_output(&teacher);
            }
            table_output::display_teachers(std::slice::from_ref(&teacher));
        }
        PeopleAction::Archive { id } => {
            let teacher = client.archive_teacher(&id).await?;
            print_success(&format!("Teacher {} archived", teacher_label(teacher, id)));
        }
        PeopleAction::Restore { id } => {
            let teacher = client.restore_teacher(&id).await?;
            print_success(&format!("Teacher {} restored", teacher_label(teacher, id)));
        }
    }
    Ok(())
}

/// Handle `teachers my-groups`
pub async fn handle_my_groups(config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let groups = client.my_groups().await?;

    if json {
        return json_output(&groups);
    }
    if groups.is_empty() {
        print_info("You are not assigned to any group");
        return Ok(());
    }
    table_output::display_groups(&groups);
    Ok(())
}

/// Handle `managers` subcommands
pub async fn handle_managers(action: PeopleAction, config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;

    match action {
        PeopleAction::Ls { filters } => {
            info!("Fetching managers...");
            let page = client.list_managers(&filters.to_query()).await?;
            if json {
                return json_output(&page);
            }
            if page.items.is_empty() {
                print_info("No managers found");
                return Ok(());
            }
            table_output::display_managers(&page.items);
            table_output::display_page_footer(&page.meta);
        }
        PeopleAction::Show { id } => {
            let manager = client.get_manager(&id).await?;
            if json {
                return json_output(&manager);
            }
            table_output::display_managers(std::slice::from_ref(&manager));
        }
        PeopleAction::Archive { id } => {
            client.archive_manager(&id).await?;
            print_success(&format!("Manager {id} archived"));
        }
        PeopleAction::Restore { id } => {
            client.restore_manager(&id).await?;
            print_success(&format!("Manager {id} restored"));
        }
    }
    Ok(())
}

/// Name of the teacher when the backend echoed it back, the id otherwise
fn teacher_label(teacher: Option<Teacher>, id: String) -> String {
    teacher.map(|t| t.full_name).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_label_falls_back_to_id() {
        let teacher: Teacher = serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "fullName": "Bobur Aliyev",
            "phone": "+998901112233"
        }))
        .unwrap();

        assert_eq!(teacher_label(Some(teacher), "t-1".into()), "Bobur Aliyev");
        assert_eq!(teacher_label(None, "t-1".into()), "t-1");
    }
}
