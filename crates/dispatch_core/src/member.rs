use h3o::LatLng;

/// Department roles as carried in the roster database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    Chief,
    AssistantChief,
    DeputyChief,
    FullMember,
    Probationary,
    Life,
    DutyCrew,
}

impl MemberRole {
    /// Display label with the underscore convention of the roster export.
    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::Chief => "CHIEF",
            MemberRole::AssistantChief => "ASSISTANT CHIEF",
            MemberRole::DeputyChief => "DEPUTY CHIEF",
            MemberRole::FullMember => "FULL MEMBER",
            MemberRole::Probationary => "PROBATIONARY",
            MemberRole::Life => "LIFE",
            MemberRole::DutyCrew => "DUTY CREW",
        }
    }
}

/// How active the member currently is in department operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Low,
    Regular,
}

/// One roster entry, read-only to the dispatch core.
///
/// `location` is the geocoded home address; members without one cannot take
/// part in distance ranking and are dropped before candidate selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub fd_id_number: String,
    pub cell_phone: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub role: MemberRole,
    pub status: ActivityStatus,
    pub qualifications: Vec<String>,
    pub location: Option<LatLng>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_qualification(&self, name: &str) -> bool {
        self.qualifications
            .iter()
            .any(|qualification| qualification.eq_ignore_ascii_case(name))
    }
}
