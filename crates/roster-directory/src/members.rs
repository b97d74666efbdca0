//! Group member listing, insert and delete.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{DirectoryClient, DirectoryResult, HttpDirectoryClient, Role};

/// A group member record as returned by the directory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMember {
    /// Directory object ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Member email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Role wire value (`OWNER`, `MANAGER`, `MEMBER`).
    #[serde(default)]
    pub role: Option<String>,
    /// Member kind (`USER`, `GROUP`, `CUSTOMER`, ...).
    #[serde(rename = "type", default)]
    pub member_type: Option<String>,
    /// Account status.
    #[serde(default)]
    pub status: Option<String>,
}

impl DirectoryMember {
    /// Returns true if the record's role field is exactly `role`.
    #[must_use]
    pub fn holds(&self, role: Role) -> bool {
        self.role.as_deref() == Some(role.as_str())
    }

    /// Returns the member identifier: the email exactly as the directory
    /// reports it.
    #[must_use]
    pub fn member_id(&self) -> Option<String> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .map(str::to_string)
    }
}

/// One page of a member listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersPage {
    /// Absent when the page is empty.
    #[serde(default)]
    pub members: Vec<DirectoryMember>,
    pub next_page_token: Option<String>,
}

/// Body of a member insert.
#[derive(Debug, Clone, Serialize)]
pub struct InsertMemberRequest {
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    #[instrument(skip(self, role), fields(role = %role))]
    async fn list_members(&self, group_id: &str, role: Role) -> DirectoryResult<BTreeSet<String>> {
        let url = self.members_url(group_id);
        let mut members = BTreeSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("roles", role.as_str().to_string()),
                ("maxResults", self.config().page_size.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: MembersPage = self
                .get(&url, &query)
                .await
                .map_err(|e| e.while_listing(group_id, role))?;

            debug!("Processing page with {} members", page.members.len());

            // The roles query is only a hint; keep exact matches.
            for member in page.members.iter().filter(|m| m.holds(role)) {
                match member.member_id() {
                    Some(id) => {
                        members.insert(id);
                    }
                    None => debug!("Skipping member without email: {:?}", member.id),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Found {} {} members in {}", members.len(), role, group_id);

        Ok(members)
    }

    #[instrument(skip(self, role), fields(role = %role))]
    async fn add_member(&self, member_id: &str, group_id: &str, role: Role) -> DirectoryResult<()> {
        let request = InsertMemberRequest {
            email: member_id.to_string(),
            role,
        };

        let created: DirectoryMember = self
            .post(&self.members_url(group_id), &request)
            .await
            .map_err(|e| e.while_adding(member_id, group_id, role))?;

        info!(
            "Added member {} as {} to group {}",
            created.email.as_deref().unwrap_or(member_id),
            role,
            group_id
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, member_id: &str, group_id: &str) -> DirectoryResult<()> {
        self.delete(&self.member_url(group_id, member_id))
            .await
            .map_err(|e| e.while_removing(member_id, group_id))?;

        info!("Removed member {} from group {}", member_id, group_id);

        Ok(())
    }
}
