//! Lazy team-name lookup for the grouped project listing
//!
//! Seeded from the current user's teams in one call; any team gid a project
//! references that the seed missed is fetched on first use. A directory
//! lives for exactly one listing call and is never shared across calls.

use std::collections::HashMap;

use asana_export_core::model::Resource;

use super::client::AsanaClient;

pub struct TeamDirectory {
    names: HashMap<String, String>,
}

impl TeamDirectory {
    /// Seed the directory from the current user's teams.
    pub async fn load(client: &AsanaClient) -> Self {
        let listing = client.list_teams().await;
        let names = listing
            .records
            .into_iter()
            .filter(|team| !team.name.is_empty())
            .map(|team| (team.gid, team.name))
            .collect();
        Self { names }
    }

    /// Resolve a team's display name, fetching the team record on first
    /// miss. An unresolvable team keeps the placeholder `Team {gid}`.
    pub async fn name_for(&mut self, client: &AsanaClient, gid: &str) -> String {
        if let Some(name) = self.names.get(gid) {
            return name.clone();
        }
        let name = match client.get_team(gid).await {
            Ok(team) if !team.name.is_empty() => team.name,
            Ok(_) => format!("Team {gid}"),
            Err(failure) => {
                log::warn!("team lookup for {gid} failed: {failure}");
                format!("Team {gid}")
            }
        };
        self.names.insert(gid.to_string(), name.clone());
        name
    }
}

/// Group projects under their team's display name, in first-seen order.
/// Projects without a team land in the "No Team" bucket.
pub async fn group_by_team(
    client: &AsanaClient,
    projects: Vec<Resource>,
) -> Vec<(String, Vec<Resource>)> {
    let mut directory = TeamDirectory::load(client).await;
    let mut groups: Vec<(String, Vec<Resource>)> = Vec::new();
    for project in projects {
        let team_name = match project.team_gid() {
            Some(gid) => directory.name_for(client, gid).await,
            None => "No Team".to_string(),
        };
        match groups.iter_mut().find(|(name, _)| *name == team_name) {
            Some((_, members)) => members.push(project),
            None => groups.push((team_name, vec![project])),
        }
    }
    groups
}
