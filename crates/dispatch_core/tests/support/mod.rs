#![allow(dead_code)]

pub mod providers;

use std::time::{Duration, Instant};

use dispatch_core::member::{ActivityStatus, Member, MemberRole};
use dispatch_core::session::{DispatchSession, SessionPhase};
use h3o::LatLng;

/// Reference incident location used across the dispatch tests.
pub const INCIDENT_LAT: f64 = 41.340992;
pub const INCIDENT_LNG: f64 = -74.168008;

pub fn coordinate(lat: f64, lng: f64) -> LatLng {
    LatLng::new(lat, lng).expect("valid coordinate")
}

pub fn incident_coordinate() -> LatLng {
    coordinate(INCIDENT_LAT, INCIDENT_LNG)
}

pub fn member_at(id: &str, lat: f64, lng: f64) -> Member {
    Member {
        id: id.to_string(),
        first_name: "Member".to_string(),
        last_name: id.to_string(),
        fd_id_number: id.to_string(),
        cell_phone: "555-0000".to_string(),
        address_line1: "1 Main St".to_string(),
        city: "Monroe".to_string(),
        state: "NY".to_string(),
        role: MemberRole::FullMember,
        status: ActivityStatus::Regular,
        qualifications: vec!["Interior".to_string()],
        location: Some(coordinate(lat, lng)),
    }
}

pub fn member_unlocated(id: &str) -> Member {
    let mut member = member_at(id, 0.0, 0.0);
    member.location = None;
    member
}

/// Drain the session until it settles or the timeout passes. Returns whether
/// a settled phase was reached.
pub fn drain_until_settled(session: &mut DispatchSession, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        session.drain();
        if matches!(session.phase(), SessionPhase::Settled(_)) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}
