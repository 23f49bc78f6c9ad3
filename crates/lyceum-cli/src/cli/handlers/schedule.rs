//! Group, room and enrollment command handlers

use crate::cli::commands::{EnrollmentFilters, GroupAction};
use crate::client::create_authenticated_client;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, print_info, print_success, table_output};
use lyceum_sdk::{EnrollmentQuery, GroupQuery};
use tracing::info;

/// Handle `groups` subcommands
pub async fn handle_groups(action: GroupAction, config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;

    match action {
        GroupAction::Ls { search, page } => {
            info!("Fetching groups...");
            let query = GroupQuery {
                page: Some(page.page),
                limit: Some(page.limit),
                search,
            };
            let groups = client.list_groups(&query).await?;
            if json {
                return json_output(&groups);
            }
            if groups.items.is_empty() {
                print_info("No groups found");
                return Ok(());
            }
            table_output::display_groups(&groups.items);
            table_output::display_page_footer(&groups.meta);
        }
        GroupAction::Deactivate { id, reason } => {
            let group = client.deactivate_group(&id, reason.as_deref()).await?;
            if json {
                return json_output(&group);
            }
            print_success(&format!("Group {} deactivated", group.name));
        }
    }
    Ok(())
}

/// Handle `rooms`
pub async fn handle_rooms(config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let rooms = client.list_rooms().await?;

    if json {
        return json_output(&rooms);
    }
    if rooms.is_empty() {
        print_info("No rooms found");
        return Ok(());
    }
    table_output::display_rooms(&rooms);
    Ok(())
}

/// Handle `enrollments`
pub async fn handle_enrollments(
    filters: EnrollmentFilters,
    config: &CliConfig,
    json: bool,
) -> Result<()> {
    let client = create_authenticated_client(config)?;

    let query = EnrollmentQuery {
        student_id: filters.student,
        group_id: filters.group,
        status: filters.status.map(Into::into),
        from: filters.from.map(|date| date.to_string()),
        to: filters.to.map(|date| date.to_string()),
        page: Some(filters.page.page),
        limit: Some(filters.page.limit),
    };

    info!("Fetching enrollments...");
    let enrollments = client.list_enrollments(&query).await?;

    if json {
        return json_output(&enrollments);
    }
    if enrollments.items.is_empty() {
        print_info("No enrollments found");
        return Ok(());
    }
    table_output::display_enrollments(&enrollments.items);
    table_output::display_page_footer(&enrollments.meta);
    Ok(())
}
