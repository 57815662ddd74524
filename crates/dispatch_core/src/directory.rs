//! Roster view filtering.
//!
//! The dispatch search only considers members the operator currently has in
//! view. `DirectoryFilter` reproduces the roster panel's filter row (free-text
//! search, role, qualification) and produces the population snapshot that is
//! handed to a dispatch session at invocation time.

use crate::member::{Member, MemberRole};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryFilter {
    /// Case-insensitive substring match against name and FD ID number.
    pub query: Option<String>,
    pub role: Option<MemberRole>,
    pub qualification: Option<String>,
}

impl DirectoryFilter {
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_role(mut self, role: MemberRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_qualification(mut self, qualification: &str) -> Self {
        self.qualification = Some(qualification.to_string());
        self
    }

    pub fn matches(&self, member: &Member) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                member.first_name, member.last_name, member.fd_id_number
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        if let Some(role) = self.role {
            if member.role != role {
                return false;
            }
        }
        if let Some(qualification) = &self.qualification {
            if !member.has_qualification(qualification) {
                return false;
            }
        }
        true
    }

    /// Snapshot of the members currently in view. Cloned so the caller can
    /// hand the population to an asynchronous pipeline without holding a
    /// borrow on the roster.
    pub fn apply(&self, members: &[Member]) -> Vec<Member> {
        members
            .iter()
            .filter(|member| self.matches(member))
            .cloned()
            .collect()
    }
}
