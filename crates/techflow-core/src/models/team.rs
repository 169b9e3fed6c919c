use serde::{Deserialize, Serialize};

/// A member of the authenticated user's team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Response wrapper for `GET /team/members`.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMembersResponse {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_members_response() {
        let json = r#"{"members":[{"id":"u-1","name":"Ana Torres","email":"ana@example.com"},{"id":"u-2","name":"Lee Park","email":"lee@example.com"}]}"#;

        let resp: TeamMembersResponse =
            serde_json::from_str(json).expect("Failed to parse members response");
        assert_eq!(resp.members.len(), 2);
        assert_eq!(resp.members[1].name, "Lee Park");
    }
}
