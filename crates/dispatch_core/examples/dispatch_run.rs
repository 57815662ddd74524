//! Run a closest-responder search against a small offline roster and print
//! the ranked result.
//!
//! Run with: cargo run -p dispatch_core --example dispatch_run

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::config::DispatchConfig;
use dispatch_core::directory::DirectoryFilter;
use dispatch_core::geocode::FixedGeocoder;
use dispatch_core::matrix::{TableMatrixProvider, TravelMode};
use dispatch_core::member::{ActivityStatus, Member, MemberRole};
use dispatch_core::session::{DispatchSession, SessionPhase, SettledOutcome};
use h3o::LatLng;

const INCIDENT_ADDRESS: &str = "12 Garfield Rd, Monroe, NY";

fn roster_member(
    id: &str,
    first: &str,
    last: &str,
    role: MemberRole,
    qualifications: &[&str],
    lat: f64,
    lng: f64,
) -> Member {
    Member {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        fd_id_number: format!("1{id}"),
        cell_phone: format!("555-01{id}"),
        address_line1: "Main St".to_string(),
        city: "Monroe".to_string(),
        state: "NY".to_string(),
        role,
        status: ActivityStatus::Regular,
        qualifications: qualifications.iter().map(|q| q.to_string()).collect(),
        location: Some(LatLng::new(lat, lng).expect("valid coordinate")),
    }
}

fn main() {
    env_logger::init();

    let incident = LatLng::new(41.340992, -74.168008).expect("valid coordinate");
    let roster = vec![
        roster_member("01", "John", "Doe", MemberRole::Chief, &["Interior"], 41.3535, -74.17481),
        roster_member(
            "02",
            "Jane",
            "Smith",
            MemberRole::FullMember,
            &["EMT", "Pump Operator"],
            41.323845,
            -74.152276,
        ),
        roster_member(
            "03",
            "Ed",
            "Jones",
            MemberRole::Probationary,
            &["Interior"],
            41.3449,
            -74.1622,
        ),
    ];

    let mut geocoder = FixedGeocoder::new();
    geocoder.insert(INCIDENT_ADDRESS, incident, INCIDENT_ADDRESS);

    let mut matrix = TableMatrixProvider::new();
    for (member, driving_secs) in roster.iter().zip([540u64, 780, 300]) {
        let origin = member.location.expect("located member");
        matrix.insert_route(TravelMode::Driving, origin, incident, driving_secs, "2.1 mi");
        matrix.insert_route(TravelMode::Walking, origin, incident, driving_secs * 9, "2.1 mi");
    }

    let population = DirectoryFilter::default().apply(&roster);
    let mut session = DispatchSession::new(
        DispatchConfig::default(),
        Arc::new(geocoder),
        Arc::new(matrix),
    );
    session.submit_address(INCIDENT_ADDRESS, population, 15);

    while session.is_in_flight() {
        session.drain();
        std::thread::sleep(Duration::from_millis(5));
    }

    println!("--- Closest responders for {INCIDENT_ADDRESS} ---");
    match session.phase() {
        SessionPhase::Settled(SettledOutcome::Success(result)) => {
            for (rank, metric) in result.responders.iter().enumerate() {
                let driving = match &metric.driving {
                    dispatch_core::matrix::ModeMetric::Route {
                        distance_text,
                        duration_text,
                        ..
                    } => format!("{duration_text} ({distance_text})"),
                    dispatch_core::matrix::ModeMetric::Unavailable => "unavailable".to_string(),
                };
                println!(
                    "{}. {} [{}] - driving {}",
                    rank + 1,
                    metric.member.full_name(),
                    metric.member.role.label(),
                    driving
                );
            }
        }
        SessionPhase::Settled(SettledOutcome::Empty(target)) => {
            println!("no responders within budget of {}", target.raw_address);
        }
        SessionPhase::Settled(SettledOutcome::Error(err)) => println!("search failed: {err}"),
        phase => println!("unexpected phase: {phase:?}"),
    }
}
